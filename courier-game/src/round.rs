//! Round counters and score accumulation.
use std::time::{Duration, Instant};

use crate::scoring::RoundScore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub round_number: u32,
    pub packages_delivered: usize,
    pub total_score: i64,
    pub last_round_step_score: i64,
    pub last_round_time_score: i64,
    pub round_started: Instant,
}

impl RoundState {
    #[must_use]
    pub const fn new(now: Instant) -> Self {
        Self {
            round_number: 1,
            packages_delivered: 0,
            total_score: 0,
            last_round_step_score: 0,
            last_round_time_score: 0,
            round_started: now,
        }
    }

    /// Time spent in this round, excluding pauses.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.round_started)
    }

    /// Shift the round start forward so a pause does not count against the player.
    pub fn exclude_pause(&mut self, pause: Duration) {
        self.round_started = self.round_started.checked_add(pause).unwrap_or(self.round_started);
    }

    /// Bank a finished round and start the next one at `now`.
    pub fn complete(&mut self, score: RoundScore, now: Instant) {
        self.last_round_step_score = score.step_score;
        self.last_round_time_score = score.time_score;
        self.total_score = self.total_score.saturating_add(score.total());
        self.round_number = self.round_number.saturating_add(1);
        self.packages_delivered = 0;
        self.round_started = now;
    }
}
