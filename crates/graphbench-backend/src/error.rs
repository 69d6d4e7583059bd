//! Backend error types.

use std::path::PathBuf;
use std::time::Duration;

use graphbench_config::BackendKind;
use graphbench_core::DumpError;
use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Driver misconfigured (missing binary, invalid plan, ...)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Database directory already present
    #[error("database '{name}' already exists")]
    AlreadyExists { name: String },

    /// Database directory absent
    #[error("database '{name}' not found")]
    NotFound { name: String },

    /// Name cannot be used as a database directory
    #[error("invalid database name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Something already accepts connections on the port
    #[error("server already running on port {port}")]
    PortInUse { port: u16 },

    /// Bulk loader exited unsuccessfully
    #[error("bulk load of '{name}' failed (exit code {code:?}): {stderr}")]
    BulkLoad {
        name: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Server process died before accepting connections
    #[error("server for port {port} exited before becoming ready: {status}")]
    ServerExited { port: u16, status: String },

    /// Server did not accept connections in time
    #[error("server on port {port} not ready after {waited:?}")]
    NotReady { port: u16, waited: Duration },

    /// Executable could not be launched
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation not valid in the current process state
    #[error("{0}")]
    Lifecycle(String),

    /// Dump could not be written
    #[error(transparent)]
    Dump(#[from] DumpError),

    /// Filesystem operation failed
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Server answered a request with an error
    #[error("server error: {0}")]
    Client(String),

    /// Transport failure talking to the server
    #[error("connection failed: {0}")]
    Connection(String),

    /// Unexpected or undecodable frame
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Environment reset command failed
    #[error("environment reset '{command}' failed: {message}")]
    Reset { command: String, message: String },

    /// Backend has no implementation of the operation
    #[error("{backend} driver does not support '{operation}' yet")]
    Unsupported {
        backend: BackendKind,
        operation: &'static str,
    },
}

impl BackendError {
    /// Create a Configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    /// Create a NotFound error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Spawn error.
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a Lifecycle error.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle(message.into())
    }

    /// Create an Io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a Protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(backend: BackendKind, operation: &'static str) -> Self {
        Self::Unsupported { backend, operation }
    }

    /// Whether the error came from bringing a database or its server up.
    pub fn is_launch_error(&self) -> bool {
        matches!(
            self,
            Self::PortInUse { .. }
                | Self::BulkLoad { .. }
                | Self::ServerExited { .. }
                | Self::NotReady { .. }
                | Self::Spawn { .. }
        )
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::already_exists("cora");
        assert_eq!(err.to_string(), "database 'cora' already exists");

        let err = BackendError::PortInUse { port: 8080 };
        assert_eq!(err.to_string(), "server already running on port 8080");

        let err = BackendError::BulkLoad {
            name: "cora".to_string(),
            code: Some(3),
            stderr: "bad dump".to_string(),
        };
        assert!(err.to_string().contains("Some(3)"));
        assert!(err.to_string().contains("bad dump"));
    }

    #[test]
    fn test_unsupported_names_backend_and_operation() {
        let err = BackendError::unsupported(BackendKind::Neo4j, "create");
        assert_eq!(
            err.to_string(),
            "neo4j driver does not support 'create' yet"
        );
    }

    #[test]
    fn test_launch_errors() {
        assert!(BackendError::PortInUse { port: 1 }.is_launch_error());
        assert!(BackendError::NotReady {
            port: 1,
            waited: Duration::from_secs(1)
        }
        .is_launch_error());
        assert!(!BackendError::not_found("x").is_launch_error());
        let stopped = BackendError::lifecycle("server process not running");
        assert!(!stopped.is_launch_error());
    }
}
