//! Read-only view of a running session.
use std::collections::VecDeque;

use crate::GameStorage;
use crate::clock::Clock;
use crate::difficulty::DifficultyProfile;

use super::{EngineState, GameplayEngine, World};

/// Borrowed view handed to renderers and bots between ticks.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub profile: &'a DifficultyProfile,
    pub world: &'a World,
    pub state: EngineState,
    pub elapsed_seconds: u64,
    pub history: &'a VecDeque<String>,
}

impl Snapshot<'_> {
    /// The map as text with the player drawn as `@`.
    #[must_use]
    pub fn render(&self) -> String {
        let player = self.world.player.position;
        let mut out = String::with_capacity(self.world.map.size() * (self.world.map.size() + 1));
        for (row, cells) in self.world.map.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if row == player.row && col == player.col {
                    out.push('@');
                } else {
                    out.push(cell.glyph());
                }
            }
            out.push('\n');
        }
        out
    }

    /// One-line stats panel summary.
    #[must_use]
    pub fn status_line(&self) -> String {
        let World { player, round, map } = self.world;
        let selected = player
            .selected
            .map_or_else(|| "-".to_string(), |id| (u16::from(id) + 1).to_string());
        format!(
            "round {} | stamina {}/{} | carrying {} (selected {selected}) | delivered {}/{} | {}s | score {}",
            round.round_number,
            player.stamina,
            player.max_stamina,
            player.held.len(),
            round.packages_delivered,
            map.package_count(),
            self.elapsed_seconds,
            round.total_score
        )
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.history.back().map(String::as_str)
    }
}

impl<S, C> GameplayEngine<S, C>
where
    S: GameStorage,
    C: Clock,
{
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            profile: &self.profile,
            world: &self.world,
            state: self.state,
            elapsed_seconds: self.elapsed().as_secs(),
            history: &self.history,
        }
    }
}
