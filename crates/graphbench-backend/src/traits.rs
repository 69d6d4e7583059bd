//! Driver trait definition.
//!
//! Defines the async interface every graph database backend implements:
//! database lifecycle on disk plus the server process serving it.

use async_trait::async_trait;
use graphbench_config::BackendKind;
use graphbench_core::Graph;
use std::path::PathBuf;

use crate::error::BackendError;
use crate::types::{DatabaseStatus, ServerInfo};

/// Lifecycle driver for one graph database backend.
///
/// A driver instance owns at most one running server at a time. Database
/// names are validated before touching the filesystem.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Backend this driver talks to.
    fn kind(&self) -> BackendKind;

    /// Whether the database directory for `name` exists.
    async fn exists(&self, name: &str) -> Result<bool, BackendError>;

    /// Build database `name` from `graph`.
    ///
    /// # Returns
    /// The database directory.
    async fn create(&mut self, name: &str, graph: &Graph) -> Result<PathBuf, BackendError>;

    /// Remove database `name` and its dump. Absent databases are not an error.
    async fn delete(&mut self, name: &str) -> Result<(), BackendError>;

    /// Launch a server for `name` and wait until it accepts connections.
    async fn start_server(&mut self, name: &str) -> Result<ServerInfo, BackendError>;

    /// Kill the running server and wait for it to exit.
    async fn stop_server(&mut self) -> Result<(), BackendError>;

    /// Server currently owned by this driver.
    fn serving(&self) -> Option<&ServerInfo>;

    /// On-disk status of `name`.
    async fn status(&self, name: &str) -> Result<DatabaseStatus, BackendError>;
}
