//! Centralized balance and tuning constants for the courier simulation.
//!
//! Per-tier numbers live on [`crate::difficulty::DifficultyProfile`]; the
//! values here are shared by every tier. Keeping them together means the
//! economy can only be adjusted via reviewed code changes.

// Stamina economy ----------------------------------------------------------
pub const STARTING_STAMINA: u32 = 200;
pub const MAX_STAMINA: u32 = 200;
pub const ROUND_STAMINA_BONUS: u32 = 50;
pub const BASE_MOVE_COST: u32 = 1;

// Scoring ------------------------------------------------------------------
pub const BASE_STEP_SCORE: i64 = 1_000;
pub const STEP_PENALTY: i64 = 2;
pub const BASE_TIME_SCORE: i64 = 1_000;
pub const TIME_PENALTY: i64 = 5;

// Map limits ---------------------------------------------------------------
pub const MIN_MAP_SIZE: usize = 15;
pub const MAX_PACKAGES: usize = 5;
pub const SUPPLY_STATION_WIDTH: usize = 3;
/// Placement attempts for pickups, destinations and stripes scale with `size² × this`.
pub(crate) const PLACEMENT_ATTEMPT_FACTOR: usize = 2;

// Session ------------------------------------------------------------------
pub const HISTORY_LIMIT: usize = 8;
pub const DEFAULT_SAVE_FILE: &str = "savegame.txt";

// Status messages ----------------------------------------------------------
pub(crate) const MSG_OUT_OF_BOUNDS: &str = "Move out of bounds";
pub(crate) const MSG_OBSTACLE: &str = "Something blocks the way";
pub(crate) const MSG_TOO_TIRED: &str = "Not enough stamina to carry that load";
pub(crate) const MSG_DEADLOCK: &str = "You collapse under the load with nowhere to set it down";
pub(crate) const MSG_DEPLETED: &str = "Stamina depleted!";
pub(crate) const MSG_SPEED_BUMP: &str = "Rough ground - your next step costs double";
pub(crate) const MSG_NOTHING_HERE: &str = "Nothing to pick up here";
pub(crate) const MSG_NOTHING_SELECTED: &str = "No package selected";
pub(crate) const MSG_DROP_AT_EXIT: &str = "Keep the exit clear";
pub(crate) const MSG_DROP_OCCUPIED: &str = "Can't drop that here";
pub(crate) const MSG_EXIT_ONLY: &str = "Confirm only works at the exit";
pub(crate) const MSG_UNDELIVERED: &str = "Deliver every package before leaving";
pub(crate) const MSG_PAUSED: &str = "Paused - save and quit? (y/n)";
pub(crate) const MSG_RESUMED: &str = "Back to work";
