//! graphbench mock database
//!
//! A stand-in for a real graph database, used to exercise the full driver
//! lifecycle in tests:
//! - `mock-create-db <dump> <db_dir>`: bulk loader reading the dump format
//! - `mock-server <db_dir> -p <port> [-b <buffer>]`: server speaking the
//!   client protocol, sampling with the in-memory neighbour sampler

pub mod database;
pub mod server;

pub use database::{create_database, MockDatabase, MockDbError, GRAPH_FILE, TENSOR_FILE};
pub use server::serve;

/// Install a stderr subscriber for the mock binaries.
pub fn init_logging() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be set when embedded in tests
    let _ = tracing::subscriber::set_global_default(subscriber);
}
