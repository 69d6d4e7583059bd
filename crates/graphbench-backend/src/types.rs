//! Shared types for backend operations.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::BackendError;

/// Longest accepted database name.
pub const MAX_NAME_LEN: usize = 128;

/// A running database server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// Database being served
    pub name: String,

    /// Host clients connect to
    pub host: String,

    /// Port the server listens on
    pub port: u16,

    /// OS process id of the server
    pub pid: Option<u32>,

    /// Database directory passed to the server
    pub db_path: PathBuf,
}

/// Status of a database as seen by a driver.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    /// Database name
    pub name: String,

    /// Whether the database directory exists
    pub exists: bool,

    /// Database directory
    pub db_path: PathBuf,

    /// Bulk-load dump, if still on disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_path: Option<PathBuf>,

    /// Server owned by this driver, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerInfo>,
}

/// Check that `name` can be used as a directory under the data path.
///
/// Accepts 1 to [`MAX_NAME_LEN`] characters of `[A-Za-z0-9_.-]`, except `.`
/// and `..`.
pub fn validate_name(name: &str) -> Result<(), BackendError> {
    if name.is_empty() {
        return Err(BackendError::invalid_name(name, "name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(BackendError::invalid_name(
            name,
            format!("name is longer than {MAX_NAME_LEN} characters"),
        ));
    }
    if name == "." || name == ".." {
        return Err(BackendError::invalid_name(name, "reserved path component"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(BackendError::invalid_name(
            name,
            format!("character '{c}' is not allowed"),
        ));
    }
    Ok(())
}
