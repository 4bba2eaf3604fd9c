//! Doomsday Courier game engine
//!
//! Platform-agnostic simulation core for the doomsday delivery game: map
//! generation, the per-tick player/world state machine, scoring and session
//! persistence. Rendering and menus live with the caller.

pub mod clock;
pub mod constants;
pub mod difficulty;
pub mod engine;
pub mod grid;
pub mod input;
pub mod mapgen;
pub mod numbers;
pub mod player;
pub mod round;
pub mod save;
pub mod scoring;
pub mod storage;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use difficulty::{Difficulty, DifficultyProfile, ProfileError, Span};
pub use engine::{
    EngineError, EngineState, GameOverCause, GameplayEngine, Refusal, Seeding, Signal, Snapshot,
    TickEvent, TickOutcome, World, exit_position, player_start,
};
pub use grid::{Cell, Direction, MapGrid, PackageId, PackageSlot, PackageStatus, Pos, SupplyStation};
pub use input::Input;
pub use mapgen::{GenerationError, MapGenerator, PlacementReport};
pub use player::PlayerState;
pub use round::RoundState;
pub use save::{SaveError, SaveState, load_or_fresh};
pub use scoring::{RoundScore, score_round};
pub use storage::{FileStorage, MemoryStorage, StorageError};

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the session scalars, replacing any previous save.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be saved.
    fn save_session(&self, state: &SaveState) -> Result<(), Self::Error>;

    /// Load the saved session, `Ok(None)` when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a save exists but cannot be read.
    fn load_save(&self) -> Result<Option<SaveState>, Self::Error>;

    /// Delete the saved session. Deleting a missing save is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self) -> Result<(), Self::Error>;
}
