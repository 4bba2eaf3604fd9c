//! Difficulty tiers and their static tuning profiles.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{MAX_PACKAGES, MIN_MAP_SIZE};
use crate::numbers::usize_to_f64;

/// One of the three fixed difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Menu index used by the shell and the save file.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Easy),
            1 => Some(Self::Medium),
            2 => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Inclusive integer range used for randomized tuning values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: u32,
    pub max: u32,
}

impl Span {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Draw a value from the span. A degenerate span always yields `min`.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Errors raised when a profile violates its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("map size {size} is below the minimum of {min}")]
    MapTooSmall { size: usize, min: usize },
    #[error("package count {count} must be between 1 and {max}")]
    PackageCount { count: usize, max: usize },
    #[error("{field} range invalid (min {min} > max {max})")]
    InvertedSpan {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("profile JSON could not be parsed: {0}")]
    Parse(String),
}

/// Static per-tier constants: map size, entity counts, hazard counts, distance thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,
    pub map_size: usize,
    pub num_packages: usize,
    pub obstacle_stripes: usize,
    pub obstacle_clusters: usize,
    pub stripe_length: Span,
    pub cluster_size: Span,
    pub cluster_density: f64,
    pub supply_stations: usize,
    pub supply_bonus: Span,
    pub speed_bump_patches: usize,
    pub bump_rows: Span,
    pub bump_cols: Span,
    pub min_package_distance: f64,
    pub min_destination_distance: f64,
}

impl DifficultyProfile {
    #[must_use]
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                map_size: 15,
                num_packages: 3,
                obstacle_stripes: 4,
                obstacle_clusters: 2,
                stripe_length: Span::new(3, 5),
                cluster_size: Span::new(2, 3),
                cluster_density: 0.6,
                supply_stations: 3,
                supply_bonus: Span::new(30, 50),
                speed_bump_patches: 2,
                bump_rows: Span::new(1, 2),
                bump_cols: Span::new(2, 3),
                min_package_distance: 3.0,
                min_destination_distance: 5.0,
            },
            Difficulty::Medium => Self {
                difficulty,
                map_size: 20,
                num_packages: 4,
                obstacle_stripes: 5,
                obstacle_clusters: 3,
                stripe_length: Span::new(3, 6),
                cluster_size: Span::new(2, 3),
                cluster_density: 0.7,
                supply_stations: 3,
                supply_bonus: Span::new(25, 45),
                speed_bump_patches: 3,
                bump_rows: Span::new(1, 2),
                bump_cols: Span::new(2, 4),
                min_package_distance: 4.0,
                min_destination_distance: 6.0,
            },
            Difficulty::Hard => Self {
                difficulty,
                map_size: 25,
                num_packages: 5,
                obstacle_stripes: 6,
                obstacle_clusters: 4,
                stripe_length: Span::new(4, 7),
                cluster_size: Span::new(2, 4),
                cluster_density: 0.8,
                supply_stations: 4,
                supply_bonus: Span::new(20, 40),
                speed_bump_patches: 4,
                bump_rows: Span::new(1, 3),
                bump_cols: Span::new(2, 4),
                min_package_distance: 5.0,
                min_destination_distance: 8.0,
            },
        }
    }

    /// Parse a tuning override and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the profile breaks an invariant.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self =
            serde_json::from_str(json).map_err(|err| ProfileError::Parse(err.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check the profile invariants the map generator relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.map_size < MIN_MAP_SIZE {
            return Err(ProfileError::MapTooSmall {
                size: self.map_size,
                min: MIN_MAP_SIZE,
            });
        }
        if self.num_packages == 0 || self.num_packages > MAX_PACKAGES {
            return Err(ProfileError::PackageCount {
                count: self.num_packages,
                max: MAX_PACKAGES,
            });
        }
        for (field, span) in [
            ("stripe_length", self.stripe_length),
            ("cluster_size", self.cluster_size),
            ("supply_bonus", self.supply_bonus),
            ("bump_rows", self.bump_rows),
            ("bump_cols", self.bump_cols),
        ] {
            if span.min > span.max {
                return Err(ProfileError::InvertedSpan {
                    field,
                    min: span.min,
                    max: span.max,
                });
            }
        }
        if !(self.cluster_density > 0.0 && self.cluster_density <= 1.0) {
            return Err(ProfileError::RangeViolation {
                field: "cluster_density",
                min: 0.0,
                max: 1.0,
                value: self.cluster_density,
            });
        }
        let max_distance = usize_to_f64(self.map_size);
        for (field, value) in [
            ("min_package_distance", self.min_package_distance),
            ("min_destination_distance", self.min_destination_distance),
        ] {
            if !(0.0..=max_distance).contains(&value) {
                return Err(ProfileError::RangeViolation {
                    field,
                    min: 0.0,
                    max: max_distance,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}
