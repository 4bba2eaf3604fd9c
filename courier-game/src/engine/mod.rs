//! Per-tick gameplay state machine.
//!
//! [`GameplayEngine`] owns the map, the player and the round counters. The
//! caller feeds it at most one [`Input`] per [`GameplayEngine::tick`] and reads
//! the world back through [`Snapshot`].
mod interact;
mod movement;
mod pause;
mod snapshot;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::GameStorage;
use crate::clock::{Clock, SystemClock};
use crate::constants::{
    HISTORY_LIMIT, MSG_DROP_AT_EXIT, MSG_DROP_OCCUPIED, MSG_EXIT_ONLY, MSG_NOTHING_HERE,
    MSG_NOTHING_SELECTED, MSG_OBSTACLE, MSG_OUT_OF_BOUNDS, MSG_TOO_TIRED, MSG_UNDELIVERED,
};
use crate::difficulty::{Difficulty, DifficultyProfile, ProfileError};
use crate::grid::{MapGrid, PackageId, Pos};
use crate::input::Input;
use crate::mapgen::{GenerationError, MapGenerator};
use crate::player::PlayerState;
use crate::round::RoundState;
use crate::save::{SaveState, load_or_fresh};
use crate::scoring::RoundScore;

pub use snapshot::Snapshot;

/// Player start: bottom-left interior cell.
#[must_use]
pub const fn player_start(map_size: usize) -> Pos {
    Pos::new(map_size.saturating_sub(2), 1)
}

/// Exit: top-right interior cell.
#[must_use]
pub const fn exit_position(map_size: usize) -> Pos {
    Pos::new(1, map_size.saturating_sub(2))
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// How the map generator is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seeding {
    /// Reseed from the wall clock before every map.
    WallClock,
    /// One deterministic stream for the whole session.
    Fixed(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCause {
    StaminaDepleted,
    /// Too tired to move and nowhere to put the load down.
    Deadlock,
    /// A new map could not be built after a round.
    GenerationFailed,
}

impl GameOverCause {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StaminaDepleted => "stamina_depleted",
            Self::Deadlock => "deadlock",
            Self::GenerationFailed => "generation_failed",
        }
    }
}

impl fmt::Display for GameOverCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    AwaitingInput,
    Paused,
    GameOver(GameOverCause),
    ReturnToMenu,
}

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Continue,
    ReturnToMenu,
    GameOver(GameOverCause),
}

/// Why an action changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refusal {
    OutOfBounds,
    Obstacle,
    TooTired { stamina: u32, cost: u32 },
    NothingToPickUp,
    NothingSelected,
    /// Package label (1-based) not carried.
    NotHeld(u8),
    /// Package label outside this map's packages.
    UnknownPackage(u8),
    DropAtExit,
    CellOccupied,
    NotAtExit,
    Undelivered { remaining: usize },
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => f.write_str(MSG_OUT_OF_BOUNDS),
            Self::Obstacle => f.write_str(MSG_OBSTACLE),
            Self::TooTired { stamina, cost } => {
                write!(f, "{MSG_TOO_TIRED} (need {cost}, have {stamina})")
            }
            Self::NothingToPickUp => f.write_str(MSG_NOTHING_HERE),
            Self::NothingSelected => f.write_str(MSG_NOTHING_SELECTED),
            Self::NotHeld(label) => write!(f, "You are not carrying package {label}"),
            Self::UnknownPackage(label) => write!(f, "There is no package {label}"),
            Self::DropAtExit => f.write_str(MSG_DROP_AT_EXIT),
            Self::CellOccupied => f.write_str(MSG_DROP_OCCUPIED),
            Self::NotAtExit => f.write_str(MSG_EXIT_ONLY),
            Self::Undelivered { remaining } => {
                write!(f, "{MSG_UNDELIVERED} ({remaining} left)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    Moved { from: Pos, to: Pos, cost: u32 },
    SupplyCollected { gained: u32 },
    SpeedBump,
    PickedUp(PackageId),
    Dropped { package: PackageId, at: Pos },
    Delivered(PackageId),
    Selected(PackageId),
    RoundComplete { round: u32, score: RoundScore, elapsed_seconds: u64 },
    Refused(Refusal),
    Paused,
    Resumed { paused_for: Duration },
    Saved,
    SaveFailed,
    GameOver(GameOverCause),
}

/// Result of one [`GameplayEngine::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub signal: Signal,
    pub events: Vec<TickEvent>,
}

impl TickOutcome {
    #[must_use]
    pub fn refusal(&self) -> Option<Refusal> {
        self.events.iter().find_map(|event| match event {
            TickEvent::Refused(refusal) => Some(*refusal),
            _ => None,
        })
    }

    #[must_use]
    pub fn has(&self, wanted: &TickEvent) -> bool {
        self.events.contains(wanted)
    }
}

/// Everything the engine mutates during play.
#[derive(Debug, Clone)]
pub struct World {
    pub map: MapGrid,
    pub player: PlayerState,
    pub round: RoundState,
}

/// Session driver: owns the world and advances it one input at a time.
pub struct GameplayEngine<S, C = SystemClock>
where
    S: GameStorage,
    C: Clock,
{
    profile: DifficultyProfile,
    world: World,
    state: EngineState,
    rng: ChaCha20Rng,
    seeding: Seeding,
    storage: S,
    clock: C,
    pause_started: Option<Instant>,
    history: VecDeque<String>,
}

impl<S, C> GameplayEngine<S, C>
where
    S: GameStorage,
    C: Clock,
{
    /// Start a new game on `difficulty`, seeding maps from the wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the first map cannot be generated.
    pub fn new_game(difficulty: Difficulty, storage: S, clock: C) -> Result<Self, EngineError> {
        Self::with_profile(
            DifficultyProfile::for_difficulty(difficulty),
            Seeding::WallClock,
            storage,
            clock,
        )
    }

    /// Start a new game with a deterministic map stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the first map cannot be generated.
    pub fn with_seed(
        difficulty: Difficulty,
        seed: u64,
        storage: S,
        clock: C,
    ) -> Result<Self, EngineError> {
        Self::with_profile(
            DifficultyProfile::for_difficulty(difficulty),
            Seeding::Fixed(seed),
            storage,
            clock,
        )
    }

    /// Start a new game on a custom (for example JSON-tuned) profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or the first map cannot be generated.
    pub fn with_profile(
        profile: DifficultyProfile,
        seeding: Seeding,
        storage: S,
        clock: C,
    ) -> Result<Self, EngineError> {
        profile.validate()?;
        let save = SaveState::fresh(profile.difficulty);
        Self::start(profile, save, seeding, storage, clock)
    }

    /// Continue the saved session, or start fresh on the default tier when
    /// the save is missing or unreadable.
    ///
    /// # Errors
    ///
    /// Returns an error if the first map cannot be generated.
    pub fn resume(storage: S, clock: C) -> Result<Self, EngineError> {
        Self::resume_seeded(storage, clock, Seeding::WallClock)
    }

    /// [`Self::resume`] with a deterministic map stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the first map cannot be generated.
    pub fn resume_with_seed(storage: S, clock: C, seed: u64) -> Result<Self, EngineError> {
        Self::resume_seeded(storage, clock, Seeding::Fixed(seed))
    }

    fn resume_seeded(storage: S, clock: C, seeding: Seeding) -> Result<Self, EngineError> {
        let save = load_or_fresh(&storage, Difficulty::default());
        let profile = DifficultyProfile::for_difficulty(save.difficulty);
        Self::start(profile, save, seeding, storage, clock)
    }

    fn start(
        profile: DifficultyProfile,
        save: SaveState,
        seeding: Seeding,
        storage: S,
        clock: C,
    ) -> Result<Self, EngineError> {
        let mut rng = match seeding {
            Seeding::Fixed(seed) => ChaCha20Rng::seed_from_u64(seed),
            Seeding::WallClock => ChaCha20Rng::seed_from_u64(wall_clock_seed()),
        };
        let start = player_start(profile.map_size);
        let map = MapGenerator::new(&profile).generate(
            start,
            exit_position(profile.map_size),
            &mut rng,
        )?;

        let mut player = PlayerState::new(start);
        player.max_stamina = save.max_stamina;
        player.stamina = save.stamina.min(save.max_stamina);

        let mut round = RoundState::new(clock.now());
        round.round_number = save.round_number;
        round.total_score = save.total_score;
        round.last_round_step_score = save.last_round_step_score;
        round.last_round_time_score = save.last_round_time_score;

        let state = if player.stamina == 0 {
            EngineState::GameOver(GameOverCause::StaminaDepleted)
        } else {
            EngineState::AwaitingInput
        };
        log::info!(
            "starting {} session at round {} with {} stamina",
            profile.difficulty,
            round.round_number,
            player.stamina
        );

        Ok(Self {
            profile,
            world: World { map, player, round },
            state,
            rng,
            seeding,
            storage,
            clock,
            pause_started: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        })
    }

    /// Advance the session by one input. `None` (no key this frame) changes nothing.
    pub fn tick(&mut self, input: Option<Input>) -> TickOutcome {
        let mut events = Vec::new();
        match (self.state, input) {
            (EngineState::AwaitingInput, Some(input)) => self.handle_play(input, &mut events),
            (EngineState::Paused, Some(input)) => self.handle_pause(input, &mut events),
            _ => {}
        }
        for event in &events {
            log::debug!("tick event: {event:?}");
        }
        TickOutcome {
            signal: self.signal(),
            events,
        }
    }

    fn handle_play(&mut self, input: Input, events: &mut Vec<TickEvent>) {
        match input {
            Input::Move(dir) => self.step(dir, events),
            Input::Pickup => self.pick_up(events),
            Input::Drop => self.drop_selected(events),
            Input::Select(label) => self.select(label, events),
            Input::Confirm => self.confirm(events),
            Input::Escape => self.pause(events),
            Input::Yes | Input::No => {}
        }
    }

    #[must_use]
    pub const fn signal(&self) -> Signal {
        match self.state {
            EngineState::AwaitingInput | EngineState::Paused => Signal::Continue,
            EngineState::GameOver(cause) => Signal::GameOver(cause),
            EngineState::ReturnToMenu => Signal::ReturnToMenu,
        }
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub const fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Apply a closure to the mutable world, for tooling and tests that stage positions.
    pub fn with_world_mut<R>(&mut self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world)
    }

    /// Recent status messages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Round time so far, frozen while paused.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let now = self.pause_started.unwrap_or_else(|| self.clock.now());
        self.world.round.elapsed(now)
    }

    /// Session scalars in their persisted form.
    #[must_use]
    pub fn save_state(&self) -> SaveState {
        let World { player, round, .. } = &self.world;
        SaveState {
            difficulty: self.profile.difficulty,
            round_number: round.round_number,
            total_score: round.total_score,
            last_round_step_score: round.last_round_step_score,
            last_round_time_score: round.last_round_time_score,
            stamina: player.stamina,
            max_stamina: player.max_stamina,
        }
    }

    pub(crate) fn push_message(&mut self, message: impl Into<String>) {
        if self.history.len() == HISTORY_LIMIT {
            let _ = self.history.pop_front();
        }
        self.history.push_back(message.into());
    }

    pub(crate) fn refuse(&mut self, refusal: Refusal, events: &mut Vec<TickEvent>) {
        self.push_message(refusal.to_string());
        events.push(TickEvent::Refused(refusal));
    }

    pub(crate) fn end_game(&mut self, cause: GameOverCause, events: &mut Vec<TickEvent>) {
        log::info!(
            "game over ({cause}) in round {} with score {}",
            self.world.round.round_number,
            self.world.round.total_score
        );
        self.state = EngineState::GameOver(cause);
        events.push(TickEvent::GameOver(cause));
    }

    /// Build the next map, reseeding first when the session follows the wall clock.
    pub(crate) fn regenerate(&mut self) -> Result<MapGrid, GenerationError> {
        if self.seeding == Seeding::WallClock {
            self.rng = ChaCha20Rng::seed_from_u64(wall_clock_seed());
        }
        let size = self.profile.map_size;
        MapGenerator::new(&self.profile).generate(
            player_start(size),
            exit_position(size),
            &mut self.rng,
        )
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| since.as_secs() ^ u64::from(since.subsec_nanos()).rotate_left(32))
}
