//! Mock server: `mock-server <db_dir> -p <port> [-b <buffer>]`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use graphbench_mockdb::MockDatabase;
use tokio::net::TcpListener;
use tracing::debug;

/// Serve a mock database over the graphbench client protocol
#[derive(Parser, Debug)]
#[command(name = "mock-server", version, about)]
struct Cli {
    /// Database directory
    db_dir: PathBuf,

    /// Port to listen on
    #[arg(short = 'p', long)]
    port: u16,

    /// Buffer size (accepted for compatibility, unused)
    #[arg(short = 'b', long)]
    buffer: Option<u64>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    graphbench_mockdb::init_logging();
    let cli = Cli::parse();
    debug!("Buffer size: {:?}", cli.buffer);

    let database = MockDatabase::open(&cli.db_dir)
        .with_context(|| format!("failed to open {}", cli.db_dir.display()))?;
    let listener = TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("failed to bind port {}", cli.port))?;

    graphbench_mockdb::serve(listener, database).await
}
