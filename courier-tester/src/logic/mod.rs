pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::{CourierPolicy, PolicyKind};
pub use seeds::resolve_seed_inputs;
pub use simulation::{RunAggregate, RunConfig, RunEnding, RunSummary, aggregate_runs, run_session};
