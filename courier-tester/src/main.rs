mod logic;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use courier_game::Difficulty;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{PolicyKind, RunConfig, RunSummary, aggregate_runs, resolve_seed_inputs, run_session};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Easy,
    Medium,
    Hard,
    /// Every tier
    All,
}

impl TierArg {
    fn tiers(self) -> Vec<Difficulty> {
        match self {
            Self::Easy => vec![Difficulty::Easy],
            Self::Medium => vec![Difficulty::Medium],
            Self::Hard => vec![Difficulty::Hard],
            Self::All => Difficulty::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Greedy,
    Wanderer,
    /// Every built-in courier
    All,
}

impl PolicyArg {
    fn policies(self) -> Vec<PolicyKind> {
        match self {
            Self::Greedy => vec![PolicyKind::Greedy],
            Self::Wanderer => vec![PolicyKind::Wanderer],
            Self::All => PolicyKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "courier-tester", version = "0.1.0")]
#[command(about = "Headless automated play-testing for Doomsday Courier")]
struct Args {
    /// Difficulty tier to play
    #[arg(long, value_enum, default_value_t = TierArg::All)]
    tier: TierArg,

    /// Seeds to run (comma-separated; `a..b` ranges allowed)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Runs per seed, each on a derived seed
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Courier policy driving the runs
    #[arg(long, value_enum, default_value_t = PolicyArg::All)]
    policy: PolicyArg,

    /// Tick cap per run
    #[arg(long, default_value_t = 5_000)]
    max_ticks: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let plan = build_plan(&args, &seeds);
    let runs = execute_plan(&plan, args.verbose)?;

    write_reports(&args, &runs, start_time)
}

fn announce_banner() {
    println!("{}", "📦 Doomsday Courier Automated Tester".bright_cyan().bold());
    println!("{}", "====================================".cyan());
}

/// Iteration `n` of a seed plays on `seed + n`, so iteration 0 is the seed itself.
fn build_plan(args: &Args, seeds: &[u64]) -> Vec<RunConfig> {
    let mut plan = Vec::new();
    for difficulty in args.tier.tiers() {
        for policy in args.policy.policies() {
            for seed in seeds {
                for iteration in 0..args.iterations.max(1) {
                    let run_seed = seed.wrapping_add(iteration as u64);
                    plan.push(
                        RunConfig::new(difficulty, policy, run_seed)
                            .with_max_ticks(args.max_ticks),
                    );
                }
            }
        }
    }
    plan
}

fn execute_plan(plan: &[RunConfig], verbose: bool) -> Result<Vec<RunSummary>> {
    let mut runs = Vec::with_capacity(plan.len());
    for config in plan {
        let summary = run_session(*config)?;
        if verbose {
            println!(
                "▶️  [{} {} seed {}] {} rounds, score {}, {}",
                config.difficulty.to_string().green(),
                config.policy,
                config.seed,
                summary.rounds_completed,
                summary.total_score,
                summary.ending.label()
            );
        }
        log::info!(
            "{} {} seed {} finished after {} ticks",
            config.difficulty,
            config.policy,
            config.seed,
            summary.ticks
        );
        runs.push(summary);
    }
    Ok(runs)
}

fn write_reports(args: &Args, runs: &[RunSummary], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let aggregates = aggregate_runs(runs);

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, runs, &aggregates)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, runs, &aggregates)?;
        }
        _ => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(
                &mut output_target,
                runs,
                &aggregates,
                duration,
            )?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
