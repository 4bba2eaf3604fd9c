//! Session save format: one scalar per line, in a fixed order.
//!
//! ```text
//! difficulty index
//! round number
//! total score
//! last round step score
//! last round time score
//! stamina
//! max stamina
//! ```
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

use crate::GameStorage;
use crate::constants::{MAX_STAMINA, STARTING_STAMINA};
use crate::difficulty::Difficulty;

const FIELDS: [&str; 7] = [
    "difficulty",
    "round_number",
    "total_score",
    "last_round_step_score",
    "last_round_time_score",
    "stamina",
    "max_stamina",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("save data ended before `{field}`")]
    Missing { field: &'static str },
    #[error("`{field}` has unreadable value {value:?}")]
    Invalid { field: &'static str, value: String },
    #[error("unknown difficulty index {0}")]
    UnknownDifficulty(u8),
    #[error("save data is inconsistent: {0}")]
    Inconsistent(&'static str),
}

/// Scalars persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub difficulty: Difficulty,
    pub round_number: u32,
    pub total_score: i64,
    pub last_round_step_score: i64,
    pub last_round_time_score: i64,
    pub stamina: u32,
    pub max_stamina: u32,
}

impl SaveState {
    /// Starting values for a new game on `difficulty`.
    #[must_use]
    pub const fn fresh(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            round_number: 1,
            total_score: 0,
            last_round_step_score: 0,
            last_round_time_score: 0,
            stamina: STARTING_STAMINA,
            max_stamina: MAX_STAMINA,
        }
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for value in [
            i64::from(self.difficulty.index()),
            i64::from(self.round_number),
            self.total_score,
            self.last_round_step_score,
            self.last_round_time_score,
            i64::from(self.stamina),
            i64::from(self.max_stamina),
        ] {
            let _ = writeln!(out, "{value}");
        }
        out
    }

    /// Parse the line-per-field format. Extra trailing lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error when a field is missing, unreadable, or out of range.
    pub fn parse(text: &str) -> Result<Self, SaveError> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let mut next = |index: usize| {
            let field = FIELDS[index];
            lines.next().ok_or(SaveError::Missing { field }).map(|raw| (field, raw))
        };

        let difficulty_index: u8 = parse_field(next(0)?)?;
        let difficulty = Difficulty::from_index(difficulty_index)
            .ok_or(SaveError::UnknownDifficulty(difficulty_index))?;
        let state = Self {
            difficulty,
            round_number: parse_field(next(1)?)?,
            total_score: parse_field(next(2)?)?,
            last_round_step_score: parse_field(next(3)?)?,
            last_round_time_score: parse_field(next(4)?)?,
            stamina: parse_field(next(5)?)?,
            max_stamina: parse_field(next(6)?)?,
        };
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> Result<(), SaveError> {
        if self.round_number == 0 {
            return Err(SaveError::Inconsistent("round number starts at 1"));
        }
        if self.max_stamina == 0 {
            return Err(SaveError::Inconsistent("max stamina must be positive"));
        }
        if self.stamina > self.max_stamina {
            return Err(SaveError::Inconsistent("stamina exceeds max stamina"));
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>((field, raw): (&'static str, &str)) -> Result<T, SaveError> {
    raw.parse().map_err(|_| SaveError::Invalid {
        field,
        value: raw.to_string(),
    })
}

/// Load the saved session, or a fresh game on `fallback` when the save is
/// missing, truncated, or corrupt.
pub fn load_or_fresh<S: GameStorage>(storage: &S, fallback: Difficulty) -> SaveState {
    match storage.load_save() {
        Ok(Some(state)) => state,
        Ok(None) => {
            log::info!("no saved game found; starting fresh on {fallback}");
            SaveState::fresh(fallback)
        }
        Err(err) => {
            log::warn!("discarding unreadable save: {err}");
            SaveState::fresh(fallback)
        }
    }
}
