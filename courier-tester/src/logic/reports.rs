use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::simulation::{RunAggregate, RunEnding, RunSummary};

pub fn generate_console_report(
    writer: &mut dyn Write,
    runs: &[RunSummary],
    aggregates: &[RunAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Courier Run Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "======================".cyan())?;
    writeln!(writer, "Total runs: {}", runs.len())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for group in aggregates {
        writeln!(
            writer,
            "{} {}",
            group.difficulty.to_string().bold(),
            group.policy.label().bold()
        )?;
        writeln!(writer, "   Runs: {}", group.runs)?;
        writeln!(writer, "   Mean rounds: {:.2}", group.mean_rounds)?;
        writeln!(writer, "   Mean score: {:.1}", group.mean_score)?;
        writeln!(writer, "   Best score: {}", group.best_score.to_string().green())?;
        writeln!(
            writer,
            "   Endings: {} depleted, {} deadlocked, {} hit the tick limit",
            group.stamina_depleted.to_string().red(),
            group.deadlocks.to_string().red(),
            group.tick_limited.to_string().yellow()
        )?;
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "🧾 Individual Runs".bright_yellow().bold())?;
    writeln!(writer, "{}", "==================".yellow())?;
    for run in runs {
        let status = match run.ending {
            RunEnding::TickLimit | RunEnding::ReturnedToMenu => "✅".green(),
            RunEnding::GameOver(_) => "💀".red(),
        };
        writeln!(
            writer,
            "{status} [{} {} seed {}] rounds {} | score {} | deliveries {} | ticks {} | {}",
            run.difficulty,
            run.policy,
            run.seed,
            run.rounds_completed,
            run.total_score,
            run.deliveries,
            run.ticks,
            run.ending.label()
        )?;
    }
    Ok(())
}

pub fn generate_json_report(
    writer: &mut dyn Write,
    runs: &[RunSummary],
    aggregates: &[RunAggregate],
) -> Result<()> {
    let report = serde_json::json!({
        "runs": runs,
        "aggregates": aggregates,
    });
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report(
    writer: &mut dyn Write,
    runs: &[RunSummary],
    aggregates: &[RunAggregate],
) -> Result<()> {
    writeln!(writer, "# Doomsday Courier Run Results\n")?;
    writeln!(writer, "## Summary\n")?;
    writeln!(
        writer,
        "| Tier | Policy | Runs | Mean rounds | Mean score | Best | Depleted | Deadlocked | Tick limit |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|---|")?;
    for group in aggregates {
        writeln!(
            writer,
            "| {} | {} | {} | {:.2} | {:.1} | {} | {} | {} | {} |",
            group.difficulty,
            group.policy,
            group.runs,
            group.mean_rounds,
            group.mean_score,
            group.best_score,
            group.stamina_depleted,
            group.deadlocks,
            group.tick_limited
        )?;
    }

    writeln!(writer, "\n## Runs\n")?;
    for run in runs {
        writeln!(
            writer,
            "- **{} / {} / seed {}**: {} rounds, score {}, {} ticks, {}",
            run.difficulty,
            run.policy,
            run.seed,
            run.rounds_completed,
            run.total_score,
            run.ticks,
            run.ending.label()
        )?;
    }
    Ok(())
}
