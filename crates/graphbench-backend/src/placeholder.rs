//! Placeholder drivers for backends without an implementation yet.
//!
//! Both drivers can be constructed and selected through configuration, but
//! every operation fails with [`BackendError::Unsupported`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use graphbench_config::BackendKind;
use graphbench_core::Graph;

use crate::error::BackendError;
use crate::traits::Driver;
use crate::types::{DatabaseStatus, ServerInfo};

/// Neo4j driver.
///
/// **Note**: This is currently a stub implementation.
#[derive(Debug, Clone)]
pub struct Neo4jDriver {
    /// Root directory for databases
    data_path: PathBuf,
}

impl Neo4jDriver {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

#[async_trait]
impl Driver for Neo4jDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::Neo4j
    }

    async fn exists(&self, _name: &str) -> Result<bool, BackendError> {
        Err(BackendError::unsupported(self.kind(), "exists"))
    }

    async fn create(&mut self, _name: &str, _graph: &Graph) -> Result<PathBuf, BackendError> {
        Err(BackendError::unsupported(self.kind(), "create"))
    }

    async fn delete(&mut self, _name: &str) -> Result<(), BackendError> {
        Err(BackendError::unsupported(self.kind(), "delete"))
    }

    async fn start_server(&mut self, _name: &str) -> Result<ServerInfo, BackendError> {
        Err(BackendError::unsupported(self.kind(), "start_server"))
    }

    async fn stop_server(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported(self.kind(), "stop_server"))
    }

    fn serving(&self) -> Option<&ServerInfo> {
        None
    }

    async fn status(&self, _name: &str) -> Result<DatabaseStatus, BackendError> {
        Err(BackendError::unsupported(self.kind(), "status"))
    }
}

/// ArangoDB driver.
///
/// **Note**: This is currently a stub implementation.
#[derive(Debug, Clone)]
pub struct ArangoDriver {
    /// Root directory for databases
    data_path: PathBuf,
}

impl ArangoDriver {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

#[async_trait]
impl Driver for ArangoDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::ArangoDb
    }

    async fn exists(&self, _name: &str) -> Result<bool, BackendError> {
        Err(BackendError::unsupported(self.kind(), "exists"))
    }

    async fn create(&mut self, _name: &str, _graph: &Graph) -> Result<PathBuf, BackendError> {
        Err(BackendError::unsupported(self.kind(), "create"))
    }

    async fn delete(&mut self, _name: &str) -> Result<(), BackendError> {
        Err(BackendError::unsupported(self.kind(), "delete"))
    }

    async fn start_server(&mut self, _name: &str) -> Result<ServerInfo, BackendError> {
        Err(BackendError::unsupported(self.kind(), "start_server"))
    }

    async fn stop_server(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported(self.kind(), "stop_server"))
    }

    fn serving(&self) -> Option<&ServerInfo> {
        None
    }

    async fn status(&self, _name: &str) -> Result<DatabaseStatus, BackendError> {
        Err(BackendError::unsupported(self.kind(), "status"))
    }
}
