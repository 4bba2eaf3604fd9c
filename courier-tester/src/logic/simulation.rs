use std::time::Duration;

use anyhow::{Context, Result};
use courier_game::{
    Difficulty, GameOverCause, GameplayEngine, ManualClock, MemoryStorage, Signal, TickEvent,
};
use serde::Serialize;

use crate::logic::policy::{CourierPolicy, PolicyKind};

/// Simulated time between two inputs.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for one automated session.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub difficulty: Difficulty,
    pub policy: PolicyKind,
    pub seed: u64,
    pub max_ticks: usize,
}

impl RunConfig {
    #[must_use]
    pub fn new(difficulty: Difficulty, policy: PolicyKind, seed: u64) -> Self {
        Self {
            difficulty,
            policy,
            seed,
            max_ticks: 5_000,
        }
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// How a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "cause")]
pub enum RunEnding {
    GameOver(GameOverCause),
    ReturnedToMenu,
    TickLimit,
}

impl RunEnding {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::GameOver(cause) => format!("game over ({cause})"),
            Self::ReturnedToMenu => "returned to menu".to_string(),
            Self::TickLimit => "tick limit".to_string(),
        }
    }
}

/// Result of one automated session.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub difficulty: Difficulty,
    pub policy: PolicyKind,
    pub seed: u64,
    pub rounds_completed: u32,
    pub deliveries: u32,
    pub total_score: i64,
    pub best_round_score: i64,
    pub ticks: usize,
    pub refusals: usize,
    pub final_stamina: u32,
    pub ending: RunEnding,
}

/// Drive one session with a fresh policy until it ends or hits the tick limit.
///
/// # Errors
///
/// Returns an error if the engine cannot build its first map.
pub fn run_session(config: RunConfig) -> Result<RunSummary> {
    let mut policy = config.policy.create_policy(config.seed);
    run_with_policy(config, policy.as_mut())
}

/// [`run_session`] with a caller-supplied policy.
///
/// # Errors
///
/// Returns an error if the engine cannot build its first map.
pub fn run_with_policy(config: RunConfig, policy: &mut dyn CourierPolicy) -> Result<RunSummary> {
    let clock = ManualClock::new();
    let mut engine = GameplayEngine::with_seed(
        config.difficulty,
        config.seed,
        MemoryStorage::default(),
        clock.clone(),
    )
    .with_context(|| {
        format!(
            "failed to start {} session with seed {}",
            config.difficulty, config.seed
        )
    })?;

    let mut summary = RunSummary {
        difficulty: config.difficulty,
        policy: config.policy,
        seed: config.seed,
        rounds_completed: 0,
        deliveries: 0,
        total_score: 0,
        best_round_score: 0,
        ticks: 0,
        refusals: 0,
        final_stamina: 0,
        ending: RunEnding::TickLimit,
    };

    while summary.ticks < config.max_ticks {
        let input = policy.next_input(&engine.snapshot());
        let outcome = engine.tick(input);
        clock.advance(TICK_INTERVAL);
        summary.ticks += 1;

        for event in &outcome.events {
            match event {
                TickEvent::Delivered(_) => summary.deliveries += 1,
                TickEvent::Refused(refusal) => {
                    summary.refusals += 1;
                    log::trace!("{} refused: {refusal}", policy.name());
                }
                TickEvent::RoundComplete { round, score, .. } => {
                    summary.rounds_completed += 1;
                    summary.best_round_score = summary.best_round_score.max(score.total());
                    log::debug!(
                        "{} finished round {round} on seed {} for {} points",
                        policy.name(),
                        config.seed,
                        score.total()
                    );
                }
                _ => {}
            }
        }

        match outcome.signal {
            Signal::Continue => {}
            Signal::ReturnToMenu => {
                summary.ending = RunEnding::ReturnedToMenu;
                break;
            }
            Signal::GameOver(cause) => {
                summary.ending = RunEnding::GameOver(cause);
                break;
            }
        }
    }

    let world = engine.world();
    summary.total_score = world.round.total_score;
    summary.final_stamina = world.player.stamina;
    Ok(summary)
}

/// Per tier/policy roll-up of several runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunAggregate {
    pub difficulty: Difficulty,
    pub policy: PolicyKind,
    pub runs: usize,
    pub mean_rounds: f64,
    pub mean_score: f64,
    pub best_score: i64,
    pub stamina_depleted: usize,
    pub deadlocks: usize,
    pub tick_limited: usize,
}

#[must_use]
pub fn aggregate_runs(runs: &[RunSummary]) -> Vec<RunAggregate> {
    let mut groups: Vec<RunAggregate> = Vec::new();
    for run in runs {
        let index = if let Some(index) = groups
            .iter()
            .position(|g| g.difficulty == run.difficulty && g.policy == run.policy)
        {
            index
        } else {
            groups.push(RunAggregate {
                difficulty: run.difficulty,
                policy: run.policy,
                runs: 0,
                mean_rounds: 0.0,
                mean_score: 0.0,
                best_score: 0,
                stamina_depleted: 0,
                deadlocks: 0,
                tick_limited: 0,
            });
            groups.len() - 1
        };
        let group = &mut groups[index];
        group.runs += 1;
        group.mean_rounds += f64::from(run.rounds_completed);
        #[allow(clippy::cast_precision_loss)]
        let score = run.total_score as f64;
        group.mean_score += score;
        group.best_score = group.best_score.max(run.total_score);
        match run.ending {
            RunEnding::GameOver(GameOverCause::StaminaDepleted) => group.stamina_depleted += 1,
            RunEnding::GameOver(GameOverCause::Deadlock) => group.deadlocks += 1,
            RunEnding::TickLimit => group.tick_limited += 1,
            RunEnding::GameOver(GameOverCause::GenerationFailed) | RunEnding::ReturnedToMenu => {}
        }
    }
    for group in &mut groups {
        #[allow(clippy::cast_precision_loss)]
        let runs = group.runs as f64;
        group.mean_rounds /= runs;
        group.mean_score /= runs;
    }
    groups
}
