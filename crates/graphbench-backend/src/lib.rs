//! graphbench Backend - Database lifecycle and sampling benchmarks
//!
//! This crate provides a unified interface for:
//! - Building a graph database from an in-memory graph
//! - Launching and stopping the database server process
//! - Talking to the server through a client session
//! - Timing repeated random-subgraph sampling calls
//!
//! ## Drivers
//!
//! - [`MillenniumDriver`]: bulk loader and server binaries on the local machine
//! - [`Neo4jDriver`], [`ArangoDriver`]: placeholders, every operation is unsupported
//!
//! ## Example
//!
//! ```ignore
//! use graphbench_backend::{open_driver, BenchmarkPlan, SamplingBenchmark, TcpConnector};
//! use graphbench_config::BenchConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BenchConfig::default();
//!     let spec = graphbench_core::RandomGraphSpec::new(1000, 10, 16);
//!     let graph = graphbench_core::random_graph(&spec)?;
//!
//!     let driver = open_driver(config.backend.kind, &config)?;
//!     let mut bench = SamplingBenchmark::new(driver, Arc::new(TcpConnector))
//!         .with_plan(BenchmarkPlan::default());
//!     let report = bench.run("fake", Some(&graph)).await?;
//!     println!("{report}");
//!
//!     Ok(())
//! }
//! ```

mod bench;
mod client;
mod error;
mod millennium;
mod placeholder;
mod process;
pub mod protocol;
mod registry;
mod reset;
mod traits;
mod types;

pub use bench::{
    run_in_memory, time_trials, BenchmarkPlan, BenchmarkReport, InMemorySampler, Sampler,
    SamplingBenchmark, SessionSampler, IN_MEMORY_BACKEND,
};
pub use client::{Connector, Session, TcpConnector, TcpSession};
pub use error::BackendError;
pub use graphbench_config::BackendKind;
pub use millennium::{MillenniumDriver, DUMP_EXTENSION};
pub use placeholder::{ArangoDriver, Neo4jDriver};
pub use process::{
    is_port_open, ProcessHandle, ProcessState, DEFAULT_POLL_INTERVAL, DEFAULT_READY_TIMEOUT,
};
pub use registry::open_driver;
pub use reset::{DropCaches, EnvironmentReset, NoopReset};
pub use traits::Driver;
pub use types::*;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
