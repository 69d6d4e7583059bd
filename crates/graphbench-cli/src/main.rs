//! graphbench CLI - Graph database lifecycle and sampling benchmarks
//!
//! A command-line interface for building graph databases from random graphs,
//! serving them, and timing repeated random-subgraph sampling.
//!
//! # Usage
//!
//! ```bash
//! # Build a database from a cached random graph
//! graphbench create --nodes 100 --degree 10 --features 5
//!
//! # Run the sampling benchmark (creates the database when absent)
//! graphbench bench --trials 10 --num-seeds 64 --fan-out 5,5
//!
//! # Same workload against the in-memory sampler
//! graphbench baseline
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use graphbench_config::BackendKind;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod progress;

/// graphbench - Graph database sampling benchmarks
#[derive(Parser, Debug)]
#[command(name = "graphbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Path to configuration file (replaces the local config)
    #[arg(long, short = 'c', global = true, env = "GRAPHBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding databases, dumps and cached graphs
    #[arg(long, global = true, env = "GRAPHBENCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Database backend (millenniumdb, neo4j, arangodb)
    #[arg(long, global = true, env = "GRAPHBENCH_BACKEND", value_parser = parse_backend)]
    backend: Option<BackendKind>,

    /// Server port
    #[arg(long, global = true, env = "GRAPHBENCH_PORT")]
    port: Option<u16>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

/// Parse a backend name from string
fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse()
        .map_err(|e: graphbench_config::ConfigError| e.to_string())
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> graphbench_config::ConfigOverrides {
        graphbench_config::ConfigOverrides {
            data_path: self.data_dir.clone(),
            backend: self.backend,
            port: self.port,
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a database from a random graph
    Create(commands::create::CreateArgs),

    /// Delete a database and its dump
    Delete(commands::delete::DeleteArgs),

    /// Show databases under the data directory
    Status(commands::status::StatusArgs),

    /// Serve a database until interrupted
    Serve(commands::serve::ServeArgs),

    /// Time repeated subgraph sampling against a database server
    Bench(commands::bench::BenchArgs),

    /// Time the same sampling workload in memory
    Baseline(commands::baseline::BaselineArgs),

    /// Generate and cache a random graph
    Generate(commands::generate::GenerateArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flags win over the configured level
    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        commands::configured_log_level(&cli.global)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Create(args) => commands::create::execute(args, cli.global).await,
        Commands::Delete(args) => commands::delete::execute(args, cli.global).await,
        Commands::Status(args) => commands::status::execute(args, cli.global).await,
        Commands::Serve(args) => commands::serve::execute(args, cli.global).await,
        Commands::Bench(args) => commands::bench::execute(args, cli.global).await,
        Commands::Baseline(args) => commands::baseline::execute(args, cli.global).await,
        Commands::Generate(args) => commands::generate::execute(args, cli.global).await,
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global).await,
    }
}
