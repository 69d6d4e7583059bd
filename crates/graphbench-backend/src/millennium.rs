//! MillenniumDB driver.
//!
//! Databases live under the data path:
//! - `<data_path>/<name>.milldb`: bulk-load dump (topology only)
//! - `<data_path>/<name>/`: database directory built by the bulk loader
//!
//! Node features are uploaded into a tensor store after the bulk load, through
//! a temporary server and a client session.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use graphbench_config::{BackendKind, MillenniumSettings, ServerSettings};
use graphbench_core::{node_label, FeatureMatrix, Graph, GraphDumpWriter};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::client::{Connector, TcpConnector};
use crate::error::BackendError;
use crate::process::ProcessHandle;
use crate::traits::Driver;
use crate::types::{validate_name, DatabaseStatus, ServerInfo};

/// Extension of bulk-load dump files.
pub const DUMP_EXTENSION: &str = "milldb";

/// Driver for MillenniumDB's `create_db` bulk loader and server binary.
pub struct MillenniumDriver {
    /// Root directory for databases and dumps
    data_path: PathBuf,

    /// Bulk loader executable
    create_db_path: PathBuf,

    /// Server executable
    server_path: PathBuf,

    /// `-b` argument for the server
    buffer_size: Option<u64>,

    /// Tensor store holding node features
    store_name: String,

    /// Endpoint and readiness settings
    server: ServerSettings,

    /// Client transport for feature upload
    connector: Arc<dyn Connector>,

    /// Running server, if any
    process: Option<ProcessHandle>,

    /// Info about the running server
    serving: Option<ServerInfo>,
}

impl MillenniumDriver {
    /// Create a driver rooted at `data_path`.
    ///
    /// Creates the data directory and checks that both binaries exist.
    pub fn new(
        settings: &MillenniumSettings,
        data_path: impl AsRef<Path>,
        server: &ServerSettings,
    ) -> Result<Self, BackendError> {
        let data_path = data_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_path).map_err(|e| BackendError::io(&data_path, e))?;

        if !settings.create_db_path.exists() {
            return Err(BackendError::configuration(format!(
                "create_db binary not found: {}",
                settings.create_db_path.display()
            )));
        }
        if !settings.server_path.exists() {
            return Err(BackendError::configuration(format!(
                "server binary not found: {}",
                settings.server_path.display()
            )));
        }

        Ok(Self {
            data_path,
            create_db_path: settings.create_db_path.clone(),
            server_path: settings.server_path.clone(),
            buffer_size: settings.buffer_size,
            store_name: settings.store_name.clone(),
            server: server.clone(),
            connector: Arc::new(TcpConnector),
            process: None,
            serving: None,
        })
    }

    /// Use a different client transport.
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Database directory for `name`.
    pub fn db_path(&self, name: &str) -> PathBuf {
        self.data_path.join(name)
    }

    /// Bulk-load dump for `name`.
    pub fn dump_path(&self, name: &str) -> PathBuf {
        self.data_path.join(format!("{name}.{DUMP_EXTENSION}"))
    }

    /// Tensor store holding node features.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Server argv: `<db_path> -p <port> [-b <buffer_size>]`.
    fn server_args(&self, db_path: &Path) -> Vec<String> {
        let mut args = vec![
            db_path.to_string_lossy().into_owned(),
            "-p".to_string(),
            self.server.port.to_string(),
        ];
        if let Some(buffer_size) = self.buffer_size {
            args.push("-b".to_string());
            args.push(buffer_size.to_string());
        }
        args
    }

    async fn build(&mut self, name: &str, graph: &Graph) -> Result<(), BackendError> {
        let dump_path = self.dump_path(name);
        let db_path = self.db_path(name);

        GraphDumpWriter::new().write(graph, &dump_path)?;
        self.run_bulk_loader(name, &dump_path, &db_path).await?;

        if let Some(features) = graph.features() {
            self.upload_features(name, features).await?;
        }
        Ok(())
    }

    async fn run_bulk_loader(
        &self,
        name: &str,
        dump_path: &Path,
        db_path: &Path,
    ) -> Result<(), BackendError> {
        debug!(
            "Running {:?} {:?} {:?}",
            self.create_db_path, dump_path, db_path
        );
        let output = Command::new(&self.create_db_path)
            .arg(dump_path)
            .arg(db_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BackendError::spawn(&self.create_db_path, e))?;

        if !output.status.success() {
            return Err(BackendError::BulkLoad {
                name: name.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Start a temporary server and store one vector per node as `N<i>`.
    async fn upload_features(
        &mut self,
        name: &str,
        features: &FeatureMatrix,
    ) -> Result<(), BackendError> {
        let info = self.start_server(name).await?;
        let uploaded = self.put_features(&info, features).await;
        let stopped = self.stop_server().await;
        uploaded?;
        stopped?;

        debug!(
            "Uploaded {} feature rows into store '{}'",
            features.rows.len(),
            self.store_name
        );
        Ok(())
    }

    async fn put_features(
        &self,
        info: &ServerInfo,
        features: &FeatureMatrix,
    ) -> Result<(), BackendError> {
        let mut session = self.connector.connect(&info.host, info.port).await?;

        let mut result = session
            .create_tensor_store(&self.store_name, features.dim)
            .await;
        if result.is_ok() {
            for (node, row) in features.rows.iter().enumerate() {
                result = session
                    .put_tensor(&self.store_name, &node_label(node), row)
                    .await;
                if result.is_err() {
                    break;
                }
            }
        }

        let closed = session.close().await;
        result?;
        closed
    }

    /// Remove whatever a failed create left behind.
    fn rollback(&self, name: &str) {
        let db_path = self.db_path(name);
        if let Err(e) = remove_dir_if_present(&db_path) {
            warn!("Failed to remove partial database {:?}: {}", db_path, e);
        }
        let dump_path = self.dump_path(name);
        if let Err(e) = remove_file_if_present(&dump_path) {
            warn!("Failed to remove dump {:?}: {}", dump_path, e);
        }
    }
}

fn remove_dir_if_present(path: &Path) -> Result<(), BackendError> {
    match std::fs::remove_dir_all(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(BackendError::io(path, e)),
        _ => Ok(()),
    }
}

fn remove_file_if_present(path: &Path) -> Result<(), BackendError> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(BackendError::io(path, e)),
        _ => Ok(()),
    }
}

#[async_trait]
impl Driver for MillenniumDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::MillenniumDb
    }

    async fn exists(&self, name: &str) -> Result<bool, BackendError> {
        validate_name(name)?;
        Ok(self.db_path(name).is_dir())
    }

    async fn create(&mut self, name: &str, graph: &Graph) -> Result<PathBuf, BackendError> {
        if self.exists(name).await? {
            return Err(BackendError::already_exists(name));
        }

        info!(
            "Creating database '{}' ({} nodes, {} edges, {} features)",
            name,
            graph.num_nodes(),
            graph.num_edges(),
            graph.feature_dim()
        );

        if let Err(e) = self.build(name, graph).await {
            self.rollback(name);
            return Err(e);
        }

        let db_path = self.db_path(name);
        info!("Created database '{}' at {:?}", name, db_path);
        Ok(db_path)
    }

    async fn delete(&mut self, name: &str) -> Result<(), BackendError> {
        validate_name(name)?;
        if self.serving.as_ref().is_some_and(|s| s.name == name) {
            return Err(BackendError::lifecycle(format!(
                "cannot delete '{name}' while its server is running"
            )));
        }

        remove_dir_if_present(&self.db_path(name))?;
        remove_file_if_present(&self.dump_path(name))?;
        info!("Deleted database '{}'", name);
        Ok(())
    }

    async fn start_server(&mut self, name: &str) -> Result<ServerInfo, BackendError> {
        validate_name(name)?;
        if self.process.as_ref().is_some_and(ProcessHandle::is_running) {
            return Err(BackendError::lifecycle("server process already running"));
        }
        if !self.exists(name).await? {
            return Err(BackendError::not_found(name));
        }

        let db_path = self.db_path(name);
        let mut handle = ProcessHandle::new(self.server.host.clone(), self.server.port)
            .with_poll_interval(self.server.poll_interval())
            .with_ready_timeout(self.server.ready_timeout());
        let pid = handle
            .start(&self.server_path, &self.server_args(&db_path))
            .await?;

        let info = ServerInfo {
            name: name.to_string(),
            host: self.server.host.clone(),
            port: self.server.port,
            pid,
            db_path,
        };
        self.process = Some(handle);
        self.serving = Some(info.clone());
        Ok(info)
    }

    async fn stop_server(&mut self) -> Result<(), BackendError> {
        let Some(mut handle) = self.process.take() else {
            return Err(BackendError::lifecycle("server process not running"));
        };
        self.serving = None;
        handle.stop().await
    }

    fn serving(&self) -> Option<&ServerInfo> {
        self.serving.as_ref()
    }

    async fn status(&self, name: &str) -> Result<DatabaseStatus, BackendError> {
        let exists = self.exists(name).await?;
        let dump_path = self.dump_path(name);
        Ok(DatabaseStatus {
            name: name.to_string(),
            exists,
            db_path: self.db_path(name),
            dump_path: dump_path.is_file().then_some(dump_path),
            server: self.serving.clone().filter(|s| s.name == name),
        })
    }
}
