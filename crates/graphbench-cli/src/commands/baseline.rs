//! Baseline command - Time the sampling workload with the in-memory sampler

use anyhow::{Context, Result};
use clap::Args;
use graphbench_backend::run_in_memory;

use super::{load_config, load_graph, GraphArgs, PlanArgs};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the baseline command
#[derive(Args, Debug)]
pub struct BaselineArgs {
    #[command(flatten)]
    graph: GraphArgs,

    #[command(flatten)]
    plan: PlanArgs,

    /// Seed for the sampler (defaults to benchmark.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the baseline command
pub async fn execute(args: BaselineArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let plan = args.plan.plan(&config)?;
    let quiet = global.quiet || args.json;

    let graph = load_graph(&config, &args.graph, quiet)?;

    let pb = spinner(
        &format!("Sampling in memory ({} trials)...", plan.trials),
        quiet,
    );
    let report = run_in_memory(&graph, &plan, args.seed.or(config.benchmark.seed))
        .await
        .context("In-memory benchmark failed")?;
    finish_spinner(pb, &format!("Finished {} trials", report.stats.count));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(())
}
