//! CLI command implementations
//!
//! This module contains all graphbench CLI command implementations.

pub mod baseline;
pub mod bench;
pub mod config;
pub mod create;
pub mod delete;
pub mod generate;
pub mod serve;
pub mod status;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use graphbench_backend::{BenchmarkPlan, Driver};
use graphbench_config::{BenchConfig, ConfigLoader};
use graphbench_core::{load_or_generate, Graph, RandomGraphSpec};
use tracing::Level;

use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Random graph parameters shared by commands that need a graph.
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// Average number of nodes
    #[arg(long, default_value = "100")]
    pub nodes: usize,

    /// Average node degree
    #[arg(long, default_value = "10")]
    pub degree: usize,

    /// Feature width per node (0 for none)
    #[arg(long, default_value = "5")]
    pub features: usize,

    /// Seed for graph generation
    #[arg(long)]
    pub graph_seed: Option<u64>,
}

impl GraphArgs {
    pub fn spec(&self) -> RandomGraphSpec {
        let spec = RandomGraphSpec::new(self.nodes, self.degree, self.features);
        match self.graph_seed {
            Some(seed) => spec.with_seed(seed),
            None => spec,
        }
    }
}

/// Sampling workload overrides shared by `bench` and `baseline`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Number of timed sampling calls
    #[arg(long, short = 'n')]
    pub trials: Option<usize>,

    /// Seed nodes per sampling call
    #[arg(long)]
    pub num_seeds: Option<usize>,

    /// Neighbours per hop, e.g. 5,5
    #[arg(long, value_delimiter = ',')]
    pub fan_out: Option<Vec<usize>>,

    /// Fetch features of sampled nodes inside the timed section
    #[arg(long)]
    pub fetch_features: bool,
}

impl PlanArgs {
    /// Build the plan from config, then apply these overrides.
    pub fn plan(&self, config: &BenchConfig) -> Result<BenchmarkPlan> {
        let mut plan =
            BenchmarkPlan::from_settings(&config.benchmark, config.millennium.store_name.clone());
        if let Some(trials) = self.trials {
            plan.trials = trials;
        }
        if let Some(num_seeds) = self.num_seeds {
            plan.num_seeds = num_seeds;
        }
        if let Some(ref fan_out) = self.fan_out {
            plan.fan_out = fan_out.clone();
        }
        plan.fetch_features |= self.fetch_features;
        plan.validate().context("Invalid benchmark plan")?;
        Ok(plan)
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

/// Load configuration: global, then local or `--config`, then CLI overrides.
///
/// The data path is resolved against the working directory.
pub fn load_config(global: &GlobalOptions) -> Result<BenchConfig> {
    let base = current_dir()?;
    let mut loader = ConfigLoader::new();
    let mut config = loader
        .load(
            &base,
            global.config.as_deref(),
            Some(&global.to_config_overrides()),
        )
        .context("Failed to load configuration")?;

    config.storage.data_path = config.data_path(&base);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Log level from configuration, INFO when unset or unreadable.
pub fn configured_log_level(global: &GlobalOptions) -> Level {
    load_config(global)
        .ok()
        .and_then(|config| Level::from_str(&config.logging.level).ok())
        .unwrap_or(Level::INFO)
}

/// Open the driver for the configured backend.
pub fn open_driver(config: &BenchConfig) -> Result<Box<dyn Driver>> {
    graphbench_backend::open_driver(config.backend.kind, config)
        .with_context(|| format!("Failed to open {} driver", config.backend.kind))
}

/// Load the cached random graph for `args`, generating it on first use.
pub fn load_graph(config: &BenchConfig, args: &GraphArgs, quiet: bool) -> Result<Graph> {
    let spec = args.spec();
    let pb = spinner(
        &format!("Loading graph {}...", spec.cache_file_name()),
        quiet,
    );
    let graph = load_or_generate(&config.graph_cache_dir(), &spec)
        .context("Failed to load random graph")?;
    finish_spinner(
        pb,
        &format!(
            "Graph ready: {} nodes, {} edges, {} features",
            graph.num_nodes(),
            graph.num_edges(),
            graph.feature_dim()
        ),
    );
    Ok(graph)
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
