//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.graphbench/config.toml`
//! 2. Local config: `.graphbench/config.toml` (in the working directory)
//! 3. CLI overrides
//!
//! Later sources override earlier ones. An explicit config file passed on the
//! command line replaces the local config.

use crate::error::ConfigError;
use crate::{
    BackendConfig, BenchConfig, BenchmarkSettings, ConfigOverrides, LoggingConfig,
    MillenniumSettings, ServerSettings, StorageConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".graphbench";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".graphbench";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.graphbench`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<BenchConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.graphbench`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path under a base directory.
    pub fn local_config_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration with optional CLI overrides.
    ///
    /// Merges config in order: global → local (or `explicit`) → overrides.
    pub fn load(
        &mut self,
        base_dir: &Path,
        explicit: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BenchConfig, ConfigError> {
        let mut config = BenchConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        let local = match explicit {
            Some(path) => {
                debug!("Loading config from {:?}", path);
                Some(load_config_file(path)?)
            }
            None => self.load_local(base_dir)?,
        };
        if let Some(local_config) = local {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<BenchConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;
        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration under a base directory.
    pub fn load_local(&self, base_dir: &Path) -> Result<Option<BenchConfig>, ConfigError> {
        let local_path = self.local_config_path(base_dir);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the global config file.
    pub fn save_global(&self, config: &BenchConfig) -> Result<(), ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };

        save_config_file(&global_dir.join(CONFIG_FILE_NAME), config)
    }

    /// Save configuration to the local config file.
    pub fn save_local(&self, base_dir: &Path, config: &BenchConfig) -> Result<(), ConfigError> {
        save_config_file(&self.local_config_path(base_dir), config)
    }

    /// Initialize the global configuration directory.
    ///
    /// Creates `~/.graphbench/config.toml` with default configuration.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };
        init_config_dir(global_dir)
    }

    /// Initialize local configuration.
    ///
    /// Creates `.graphbench/config.toml` with default configuration.
    pub fn init_local(&self, base_dir: &Path) -> Result<PathBuf, ConfigError> {
        init_config_dir(&base_dir.join(LOCAL_CONFIG_DIR))
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

fn init_config_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        save_config_file(&config_path, &BenchConfig::default())?;
    }

    Ok(config_path)
}

/// Load a configuration file from disk.
pub(crate) fn load_config_file(path: &Path) -> Result<BenchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &BenchConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// Overlay values equal to the default are treated as unset, which lets a
/// partial local file inherit the rest from the global one.
fn merge_configs(base: BenchConfig, overlay: BenchConfig) -> BenchConfig {
    BenchConfig {
        storage: merge_storage(base.storage, overlay.storage),
        backend: merge_backend(base.backend, overlay.backend),
        millennium: merge_millennium(base.millennium, overlay.millennium),
        server: merge_server(base.server, overlay.server),
        benchmark: merge_benchmark(base.benchmark, overlay.benchmark),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Pick `overlay` unless it still holds the default value.
fn pick<T: PartialEq>(base: T, overlay: T, default: T) -> T {
    if overlay != default {
        overlay
    } else {
        base
    }
}

fn merge_storage(base: StorageConfig, overlay: StorageConfig) -> StorageConfig {
    let default = StorageConfig::default();
    StorageConfig {
        data_path: pick(base.data_path, overlay.data_path, default.data_path),
        graph_cache: overlay.graph_cache.or(base.graph_cache),
    }
}

fn merge_backend(base: BackendConfig, overlay: BackendConfig) -> BackendConfig {
    BackendConfig {
        kind: pick(base.kind, overlay.kind, Default::default()),
    }
}

fn merge_millennium(base: MillenniumSettings, overlay: MillenniumSettings) -> MillenniumSettings {
    let default = MillenniumSettings::default();
    MillenniumSettings {
        create_db_path: pick(
            base.create_db_path,
            overlay.create_db_path,
            default.create_db_path,
        ),
        server_path: pick(base.server_path, overlay.server_path, default.server_path),
        buffer_size: pick(base.buffer_size, overlay.buffer_size, default.buffer_size),
        store_name: pick(base.store_name, overlay.store_name, default.store_name),
    }
}

fn merge_server(base: ServerSettings, overlay: ServerSettings) -> ServerSettings {
    let default = ServerSettings::default();
    ServerSettings {
        host: pick(base.host, overlay.host, default.host),
        port: pick(base.port, overlay.port, default.port),
        poll_interval_ms: pick(
            base.poll_interval_ms,
            overlay.poll_interval_ms,
            default.poll_interval_ms,
        ),
        ready_timeout_secs: pick(
            base.ready_timeout_secs,
            overlay.ready_timeout_secs,
            default.ready_timeout_secs,
        ),
    }
}

fn merge_benchmark(base: BenchmarkSettings, overlay: BenchmarkSettings) -> BenchmarkSettings {
    let default = BenchmarkSettings::default();
    BenchmarkSettings {
        trials: pick(base.trials, overlay.trials, default.trials),
        num_seeds: pick(base.num_seeds, overlay.num_seeds, default.num_seeds),
        fan_out: pick(base.fan_out, overlay.fan_out, default.fan_out),
        fetch_features: base.fetch_features || overlay.fetch_features,
        reset_environment: base.reset_environment || overlay.reset_environment,
        seed: overlay.seed.or(base.seed),
    }
}

fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: pick(base.level, overlay.level, LoggingConfig::default().level),
    }
}
