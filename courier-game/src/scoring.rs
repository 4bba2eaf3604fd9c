//! Round scoring from step count and elapsed time.
use serde::{Deserialize, Serialize};

use crate::constants::{BASE_STEP_SCORE, BASE_TIME_SCORE, STEP_PENALTY, TIME_PENALTY};
use crate::numbers::{saturating_i64, steps_to_i64};

/// Step and time components of one round's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundScore {
    pub step_score: i64,
    pub time_score: i64,
}

impl RoundScore {
    #[must_use]
    pub const fn total(self) -> i64 {
        self.step_score + self.time_score
    }
}

/// Score a finished round. Both components are clamped at zero.
///
/// The constants are shared by every tier; larger maps cost more steps and time,
/// which is the only difficulty scaling applied here.
#[must_use]
pub fn score_round(steps: u32, elapsed_seconds: u64) -> RoundScore {
    let step_penalty = steps_to_i64(steps).saturating_mul(STEP_PENALTY);
    let time_penalty = saturating_i64(elapsed_seconds).saturating_mul(TIME_PENALTY);
    RoundScore {
        step_score: BASE_STEP_SCORE.saturating_sub(step_penalty).max(0),
        time_score: BASE_TIME_SCORE.saturating_sub(time_penalty).max(0),
    }
}
