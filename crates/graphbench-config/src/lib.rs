//! graphbench Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.graphbench/config.toml`
//! - Local config: `.graphbench/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration for graphbench.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Backend selection
    pub backend: BackendConfig,

    /// MillenniumDB binaries and settings
    pub millennium: MillenniumSettings,

    /// Server process settings
    pub server: ServerSettings,

    /// Benchmark workload
    pub benchmark: BenchmarkSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Storage configuration for database and graph files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory holding databases and their dumps
    pub data_path: PathBuf,

    /// Directory for cached random graphs (default: `<data_path>/graphs`)
    pub graph_cache: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./tmp/graphbench"),
            graph_cache: None,
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend to drive
    pub kind: BackendKind,
}

/// Graph database backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// MillenniumDB driven through its bulk loader and server binaries (default)
    #[default]
    MillenniumDb,
    /// Neo4j (not yet supported)
    Neo4j,
    /// ArangoDB (not yet supported)
    ArangoDb,
}

impl BackendKind {
    /// All known backends.
    pub const ALL: [BackendKind; 3] = [Self::MillenniumDb, Self::Neo4j, Self::ArangoDb];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MillenniumDb => "millenniumdb",
            Self::Neo4j => "neo4j",
            Self::ArangoDb => "arangodb",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "millenniumdb" | "millennium" | "milldb" => Ok(Self::MillenniumDb),
            "neo4j" => Ok(Self::Neo4j),
            "arangodb" | "arango" => Ok(Self::ArangoDb),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// MillenniumDB binaries and server tuning.
///
/// # Example TOML
///
/// ```toml
/// [millennium]
/// create_db_path = "/opt/MillenniumDB/build/Release/bin/create_db"
/// server_path = "/opt/MillenniumDB/build/Release/bin/server_pymilldb"
/// buffer_size = 2097152
/// store_name = "feat"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MillenniumSettings {
    /// Bulk loader executable
    pub create_db_path: PathBuf,

    /// Server executable
    pub server_path: PathBuf,

    /// Buffer size passed as `-b` (omitted when unset)
    pub buffer_size: Option<u64>,

    /// Tensor store holding node features
    pub store_name: String,
}

/// Buffer size handed to the server by default (8 * 1024 * 256).
pub const DEFAULT_BUFFER_SIZE: u64 = 8 * 1024 * 256;

impl Default for MillenniumSettings {
    fn default() -> Self {
        Self {
            create_db_path: PathBuf::from("MillenniumDB/build/Release/bin/create_db"),
            server_path: PathBuf::from("MillenniumDB/build/Release/bin/server_pymilldb"),
            buffer_size: Some(DEFAULT_BUFFER_SIZE),
            store_name: "feat".to_string(),
        }
    }
}

/// Server process settings shared by every backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    /// Host the server listens on and clients connect to
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Delay between readiness checks in milliseconds
    pub poll_interval_ms: u64,

    /// Maximum wait for readiness in seconds (0 = wait forever)
    pub ready_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            poll_interval_ms: 500,
            ready_timeout_secs: 60,
        }
    }
}

impl ServerSettings {
    /// Readiness check interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Readiness timeout, `None` when unbounded.
    pub fn ready_timeout(&self) -> Option<Duration> {
        (self.ready_timeout_secs > 0).then(|| Duration::from_secs(self.ready_timeout_secs))
    }
}

/// Sampling workload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchmarkSettings {
    /// Number of timed sampling calls
    pub trials: usize,

    /// Seed nodes per sampling call
    pub num_seeds: usize,

    /// Neighbours drawn per hop
    pub fan_out: Vec<usize>,

    /// Fetch features of sampled nodes inside the timed section
    pub fetch_features: bool,

    /// Drop OS caches and cycle swap before starting the server
    pub reset_environment: bool,

    /// RNG seed for the in-memory baseline
    pub seed: Option<u64>,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            trials: 10,
            num_seeds: 64,
            fan_out: vec![5, 5],
            fetch_features: false,
            reset_environment: false,
            seed: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override data directory
    pub data_path: Option<PathBuf>,

    /// Override backend
    pub backend: Option<BackendKind>,

    /// Override server port
    pub port: Option<u16>,

    /// Override sampling trials
    pub trials: Option<usize>,

    /// Override log level
    pub log_level: Option<String>,
}

impl BenchConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref path) = overrides.data_path {
            self.storage.data_path = path.clone();
        }

        if let Some(kind) = overrides.backend {
            self.backend.kind = kind;
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(trials) = overrides.trials {
            self.benchmark.trials = trials;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const POSITIVE: &str = "must be greater than zero";

        if self.benchmark.trials == 0 {
            return Err(ConfigError::invalid_setting("benchmark.trials", POSITIVE));
        }
        if self.benchmark.num_seeds == 0 {
            return Err(ConfigError::invalid_setting(
                "benchmark.num_seeds",
                POSITIVE,
            ));
        }
        if self.benchmark.fan_out.is_empty() {
            return Err(ConfigError::invalid_setting(
                "benchmark.fan_out",
                "must list at least one hop",
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::invalid_setting("server.port", POSITIVE));
        }
        if self.millennium.store_name.is_empty() {
            return Err(ConfigError::invalid_setting(
                "millennium.store_name",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Directory for cached random graphs.
    pub fn graph_cache_dir(&self) -> PathBuf {
        self.storage
            .graph_cache
            .clone()
            .unwrap_or_else(|| self.storage.data_path.join("graphs"))
    }

    /// Resolve the data directory against a base directory.
    pub fn data_path(&self, base: &Path) -> PathBuf {
        if self.storage.data_path.is_absolute() {
            self.storage.data_path.clone()
        } else {
            base.join(&self.storage.data_path)
        }
    }
}
