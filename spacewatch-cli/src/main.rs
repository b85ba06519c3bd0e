//! spacewatch - fleet overview CLI
//!
//! Thin consumer over spacewatch-core: fetches every stack with its health
//! metrics and prints a fleet summary, or triggers a run on demand.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use spacewatch_core::{Config, FleetSummary, StackService, StacksWithMetrics};

#[derive(Parser, Debug)]
#[command(name = "spacewatch")]
#[command(about = "Infrastructure stack monitoring")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all stacks with their health metrics
    Stacks {
        /// Emit the raw result as JSON instead of the fleet view
        #[arg(long)]
        json: bool,
    },
    /// Trigger a run against a stack
    Trigger {
        /// Stack id to trigger
        stack_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = match spacewatch_core::logging::init(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: file logging disabled: {}", e);
            None
        }
    };

    let service = StackService::new(&config).context("failed to initialize service")?;

    match args.command {
        Command::Stacks { json } => {
            let result = service
                .stacks_with_metrics()
                .await
                .context("failed to fetch stacks")?;
            let summary = service.summary(&result);
            tracing::info!(
                stacks = summary.total_stacks,
                healthy = summary.healthy_stacks,
                "fetch cycle complete"
            );

            if json {
                print_json(&result, &summary)?;
            } else {
                print_fleet(&result, &summary);
            }
        }
        Command::Trigger { stack_id } => {
            let run_id = service
                .trigger_run(&stack_id)
                .await
                .context("failed to trigger run")?;
            match run_id {
                Some(id) => println!("Triggered run {} on stack {}", id, stack_id),
                None => println!("Run triggered on stack {} but no run id returned", stack_id),
            }
        }
    }

    Ok(())
}

fn print_fleet(result: &StacksWithMetrics, summary: &FleetSummary) {
    println!();
    println!(
        "FLEET  {} stacks, {} healthy ({}%)   {} resources, {} runs",
        summary.total_stacks,
        summary.healthy_stacks,
        summary.health_percent,
        summary.total_resources,
        summary.total_runs
    );
    println!();

    if result.stacks.is_empty() {
        println!("  No stacks found.");
        println!();
        return;
    }

    for stack in &result.stacks {
        let Some(metrics) = result.metrics.get(&stack.id) else {
            continue;
        };

        let success_rate = if metrics.total_runs > 0 {
            format!(
                "{}%",
                ((metrics.successful_runs as f64 / metrics.total_runs as f64) * 100.0).round()
            )
        } else {
            "n/a".to_string()
        };

        println!("{}  [{}]", stack.name, metrics.last_run_state);
        println!(
            "   {} @ {}   runs: {} ({} success)   resources: {}",
            stack.repository, stack.branch, metrics.total_runs, success_rate, metrics.resource_count
        );

        if let Some(time) = metrics.last_run_time {
            let by = metrics.last_triggered_by.as_deref().unwrap_or("unknown");
            println!(
                "   last run {} by {}",
                time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                by
            );
        }

        // First three labels shown, the rest counted
        if !stack.labels.is_empty() {
            let shown: Vec<&str> = stack.labels.iter().take(3).map(String::as_str).collect();
            let more = stack.labels.len().saturating_sub(3);
            if more > 0 {
                println!("   labels: {} (+{} more)", shown.join(", "), more);
            } else {
                println!("   labels: {}", shown.join(", "));
            }
        }
        println!();
    }
}

fn print_json(result: &StacksWithMetrics, summary: &FleetSummary) -> Result<()> {
    let json = serde_json::json!({
        "summary": summary,
        "stacks": result.stacks,
        "metrics": result.metrics,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
