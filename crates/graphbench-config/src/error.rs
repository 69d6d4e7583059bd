//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, checking or writing benchmark configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file or directory could not be accessed.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the benchmark settings.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not determine home directory")]
    NoHomeDir,

    /// Backend name matches none of the known kinds or aliases.
    #[error("unknown backend '{0}'. Valid values: millenniumdb, neo4j, arangodb")]
    UnknownBackend(String),

    /// A setting the benchmark cannot run with. `key` is the dotted TOML path.
    #[error("invalid setting '{key}': {message}")]
    InvalidSetting { key: &'static str, message: String },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io("read config file", path, source)
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io("write config file", path, source)
    }

    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io("create config directory", path, source)
    }

    fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_setting(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            message: message.into(),
        }
    }

    /// Dotted key of the offending setting, for validation failures.
    pub fn setting_key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSetting { key, .. } => Some(key),
            _ => None,
        }
    }
}
