//! Procedural map generation with constrained, capped random placement.
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::{PLACEMENT_ATTEMPT_FACTOR, SUPPLY_STATION_WIDTH};
use crate::difficulty::{DifficultyProfile, ProfileError};
use crate::grid::{Cell, Direction, MapGrid, Pos};
use crate::numbers::euclidean;

#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("cannot generate from an invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error("no free interior cell left for {feature} {index}")]
    NoFreeCell { feature: &'static str, index: usize },
}

/// How many features of each kind made it onto the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub relaxed_pickups: usize,
    pub relaxed_destinations: usize,
    pub stripes: usize,
    pub clusters: usize,
    pub stations: usize,
    pub bump_patches: usize,
}

/// Builds a fresh map for a profile.
#[derive(Debug, Clone, Copy)]
pub struct MapGenerator<'a> {
    profile: &'a DifficultyProfile,
}

impl<'a> MapGenerator<'a> {
    #[must_use]
    pub const fn new(profile: &'a DifficultyProfile) -> Self {
        Self { profile }
    }

    /// Generate a map with the player start and exit kept clear.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidProfile`] if the profile fails validation,
    /// or [`GenerationError::NoFreeCell`] if a package cannot be placed at all.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        player_start: Pos,
        exit: Pos,
        rng: &mut R,
    ) -> Result<MapGrid, GenerationError> {
        self.generate_with_report(player_start, exit, rng)
            .map(|(map, _)| map)
    }

    /// Same as [`Self::generate`], also reporting how far each placement pass got.
    ///
    /// # Errors
    ///
    /// See [`Self::generate`].
    pub fn generate_with_report<R: Rng + ?Sized>(
        &self,
        player_start: Pos,
        exit: Pos,
        rng: &mut R,
    ) -> Result<(MapGrid, PlacementReport), GenerationError> {
        self.profile.validate()?;
        let mut layout = Layout::new(self.profile, player_start, exit);
        let mut report = PlacementReport::default();

        let pickups = layout.place_pickups(rng, &mut report)?;
        layout.place_destinations(&pickups, rng, &mut report)?;
        report.stripes = layout.place_stripes(rng);
        report.clusters = layout.place_clusters(rng);
        report.stations = layout.place_stations(rng);
        report.bump_patches = layout.place_speed_bumps(rng);

        let profile = self.profile;
        if report.stripes < profile.obstacle_stripes
            || report.clusters < profile.obstacle_clusters
            || report.stations < profile.supply_stations
            || report.bump_patches < profile.speed_bump_patches
        {
            log::debug!(
                "map generation fell short: stripes {}/{}, clusters {}/{}, stations {}/{}, bumps {}/{}",
                report.stripes,
                profile.obstacle_stripes,
                report.clusters,
                profile.obstacle_clusters,
                report.stations,
                profile.supply_stations,
                report.bump_patches,
                profile.speed_bump_patches
            );
        }

        Ok((layout.map, report))
    }
}

struct Layout<'a> {
    profile: &'a DifficultyProfile,
    map: MapGrid,
    protected: HashSet<Pos>,
}

impl<'a> Layout<'a> {
    fn new(profile: &'a DifficultyProfile, player_start: Pos, exit: Pos) -> Self {
        let map = MapGrid::bordered(profile.map_size, exit);
        let protected = HashSet::from([player_start, map.exit()]);
        Self {
            profile,
            map,
            protected,
        }
    }

    fn size(&self) -> usize {
        self.map.size()
    }

    fn random_interior<R: Rng + ?Sized>(&self, rng: &mut R) -> Pos {
        let last = self.size() - 1;
        Pos::new(rng.gen_range(1..last), rng.gen_range(1..last))
    }

    fn is_open(&self, pos: Pos) -> bool {
        self.map.is_floor(pos) && !self.protected.contains(&pos)
    }

    /// Open and not touching a protected cell, so obstacles never seal one in directly.
    fn is_obstacle_candidate(&self, pos: Pos) -> bool {
        self.is_open(pos) && pos.neighbors4().all(|n| !self.protected.contains(&n))
    }

    fn pick_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Pos> {
        let free: Vec<Pos> = self
            .map
            .interior_positions()
            .filter(|pos| self.is_open(*pos))
            .collect();
        free.choose(rng).copied()
    }

    fn sample_spaced<R, F>(&self, rng: &mut R, accept: F) -> Option<Pos>
    where
        R: Rng + ?Sized,
        F: Fn(Pos) -> bool,
    {
        let attempts = self.size() * self.size() * PLACEMENT_ATTEMPT_FACTOR;
        (0..attempts)
            .map(|_| self.random_interior(rng))
            .find(|pos| self.is_open(*pos) && accept(*pos))
    }

    fn place_pickups<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        report: &mut PlacementReport,
    ) -> Result<Vec<Pos>, GenerationError> {
        let min_gap = self.profile.min_package_distance;
        let mut pickups: Vec<Pos> = Vec::with_capacity(self.profile.num_packages);
        for index in 0..self.profile.num_packages {
            let spaced = self.sample_spaced(rng, |pos| {
                pickups
                    .iter()
                    .all(|prior| euclidean(prior.as_tuple(), pos.as_tuple()) >= min_gap)
            });
            let pos = match spaced {
                Some(pos) => pos,
                None => {
                    report.relaxed_pickups += 1;
                    self.pick_free_cell(rng)
                        .ok_or(GenerationError::NoFreeCell {
                            feature: "pickup",
                            index,
                        })?
                }
            };
            let _ = self.protected.insert(pos);
            pickups.push(pos);
        }
        Ok(pickups)
    }

    fn place_destinations<R: Rng + ?Sized>(
        &mut self,
        pickups: &[Pos],
        rng: &mut R,
        report: &mut PlacementReport,
    ) -> Result<(), GenerationError> {
        let min_gap = self.profile.min_package_distance;
        let min_travel = self.profile.min_destination_distance;
        let mut destinations: Vec<Pos> = Vec::with_capacity(pickups.len());
        for (index, pickup) in pickups.iter().enumerate() {
            let spaced = self.sample_spaced(rng, |pos| {
                euclidean(pickup.as_tuple(), pos.as_tuple()) >= min_travel
                    && destinations
                        .iter()
                        .all(|prior| euclidean(prior.as_tuple(), pos.as_tuple()) >= min_gap)
            });
            let pos = match spaced {
                Some(pos) => pos,
                None => {
                    report.relaxed_destinations += 1;
                    self.pick_free_cell(rng)
                        .ok_or(GenerationError::NoFreeCell {
                            feature: "destination",
                            index,
                        })?
                }
            };
            let _ = self.protected.insert(pos);
            destinations.push(pos);
        }
        for (pickup, destination) in pickups.iter().zip(&destinations) {
            let _ = self.map.add_package(*pickup, *destination);
        }
        Ok(())
    }

    fn place_stripes<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let attempts = self.size() * self.size() * PLACEMENT_ATTEMPT_FACTOR;
        let mut placed = 0;
        for _ in 0..attempts {
            if placed >= self.profile.obstacle_stripes {
                break;
            }
            let start = self.random_interior(rng);
            let dir = if rng.gen_bool(0.5) {
                Direction::Right
            } else {
                Direction::Down
            };
            let length = self.profile.stripe_length.sample(rng) as usize;
            if let Some(run) = self.stripe_cells(start, dir, length) {
                for pos in &run {
                    self.map.set_cell(*pos, Cell::Obstacle);
                }
                placed += 1;
            }
        }
        placed
    }

    /// Cells of a stripe, or `None` when any cell is unusable or would merge into
    /// an existing obstacle.
    fn stripe_cells(&self, start: Pos, dir: Direction, length: usize) -> Option<Vec<Pos>> {
        let mut run = Vec::with_capacity(length);
        let mut pos = start;
        for step in 0..length {
            if step > 0 {
                pos = pos.step(dir)?;
            }
            if !self.is_obstacle_candidate(pos) {
                return None;
            }
            run.push(pos);
        }
        let touches_obstacle = run.iter().any(|cell| {
            cell.neighbors8()
                .any(|n| !run.contains(&n) && self.map.cell(n) == Some(Cell::Obstacle))
        });
        (!touches_obstacle).then_some(run)
    }

    fn place_clusters<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let attempts = self.size() * self.size();
        let density = self.profile.cluster_density;
        let mut placed = 0;
        for _ in 0..attempts {
            if placed >= self.profile.obstacle_clusters {
                break;
            }
            let origin = self.random_interior(rng);
            let height = self.profile.cluster_size.sample(rng) as usize;
            let width = self.profile.cluster_size.sample(rng) as usize;
            let block: Vec<Pos> = (0..height)
                .flat_map(|dr| (0..width).map(move |dc| Pos::new(origin.row + dr, origin.col + dc)))
                .collect();
            if !block.iter().all(|pos| self.is_obstacle_candidate(*pos)) {
                continue;
            }
            let mut filled = 0;
            for pos in block {
                if rng.gen_bool(density) {
                    self.map.set_cell(pos, Cell::Obstacle);
                    filled += 1;
                }
            }
            if filled > 0 {
                placed += 1;
            }
        }
        placed
    }

    fn place_stations<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let attempts = self.size() * self.size();
        let last = self.size() - 1;
        let mut placed = 0;
        for _ in 0..attempts {
            if placed >= self.profile.supply_stations {
                break;
            }
            let row = rng.gen_range(1..last);
            let col = rng.gen_range(1..=last - SUPPLY_STATION_WIDTH);
            let left = Pos::new(row, col);
            let span_open =
                (0..SUPPLY_STATION_WIDTH).all(|offset| self.is_open(Pos::new(row, col + offset)));
            if span_open {
                self.map.add_station(left);
                placed += 1;
            }
        }
        placed
    }

    fn place_speed_bumps<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let attempts = self.size() * self.size();
        let mut placed = 0;
        for _ in 0..attempts {
            if placed >= self.profile.speed_bump_patches {
                break;
            }
            let origin = self.random_interior(rng);
            let rows = self.profile.bump_rows.sample(rng) as usize;
            let cols = self.profile.bump_cols.sample(rng) as usize;
            let mut laid = 0;
            for dr in 0..rows {
                // Ragged edges: each row may start one cell in or stop one cell short.
                let inset = usize::from(rng.gen_bool(0.3));
                let trim = usize::from(cols > 1 && rng.gen_bool(0.3));
                for dc in inset..cols.saturating_sub(trim) {
                    let pos = Pos::new(origin.row + dr, origin.col + dc);
                    if self.is_open(pos) {
                        self.map.add_speed_bump(pos);
                        laid += 1;
                    }
                }
            }
            if laid > 0 {
                placed += 1;
            }
        }
        placed
    }
}
