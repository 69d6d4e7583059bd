//! Mock bulk loader: `mock-create-db <dump> <db_dir>`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Build a mock database directory from a graph dump
#[derive(Parser, Debug)]
#[command(name = "mock-create-db", version, about)]
struct Cli {
    /// Dump file to load
    dump: PathBuf,

    /// Database directory to create
    db_dir: PathBuf,
}

fn main() -> Result<()> {
    graphbench_mockdb::init_logging();
    let cli = Cli::parse();

    graphbench_mockdb::create_database(&cli.dump, &cli.db_dir)
        .with_context(|| format!("failed to load {}", cli.dump.display()))?;
    Ok(())
}
