//! Bench command - Time repeated subgraph sampling against a server

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use graphbench_backend::{
    DropCaches, EnvironmentReset, NoopReset, SamplingBenchmark, TcpConnector,
};

use super::{load_config, load_graph, open_driver, GraphArgs, PlanArgs};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the bench command
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Database name (defaults to Fake_N<nodes>_D<degree>_F<features>)
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    graph: GraphArgs,

    #[command(flatten)]
    plan: PlanArgs,

    /// Drop OS caches and cycle swap before starting the server (needs sudo)
    #[arg(long)]
    reset_environment: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the bench command
pub async fn execute(args: BenchArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let plan = args.plan.plan(&config)?;
    let quiet = global.quiet || args.json;
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| args.graph.spec().database_name());

    let driver = open_driver(&config)?;
    let graph = if driver.exists(&name).await? {
        None
    } else {
        Some(load_graph(&config, &args.graph, quiet)?)
    };

    let reset: Box<dyn EnvironmentReset> =
        if args.reset_environment || config.benchmark.reset_environment {
            Box::new(DropCaches::new())
        } else {
            Box::new(NoopReset)
        };

    let mut bench = SamplingBenchmark::new(driver, Arc::new(TcpConnector))
        .with_plan(plan)
        .with_reset(reset);

    let pb = spinner(
        &format!("Sampling '{}' ({} trials)...", name, bench.plan().trials),
        quiet,
    );
    let report = bench
        .run(&name, graph.as_ref())
        .await
        .with_context(|| format!("Benchmark of '{}' failed", name))?;
    finish_spinner(pb, &format!("Finished {} trials", report.stats.count));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(())
}
