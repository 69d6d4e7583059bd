//! Driver registry.
//!
//! Maps a [`BackendKind`] from configuration to a boxed [`Driver`].

use graphbench_config::{BackendKind, BenchConfig};
use tracing::debug;

use crate::error::BackendError;
use crate::millennium::MillenniumDriver;
use crate::placeholder::{ArangoDriver, Neo4jDriver};
use crate::traits::Driver;

/// Open the driver for `kind` using the storage and server settings in `config`.
pub fn open_driver(
    kind: BackendKind,
    config: &BenchConfig,
) -> Result<Box<dyn Driver>, BackendError> {
    debug!("Opening {} driver at {:?}", kind, config.storage.data_path);
    let driver: Box<dyn Driver> = match kind {
        BackendKind::MillenniumDb => Box::new(MillenniumDriver::new(
            &config.millennium,
            &config.storage.data_path,
            &config.server,
        )?),
        BackendKind::Neo4j => Box::new(Neo4jDriver::new(&config.storage.data_path)),
        BackendKind::ArangoDb => Box::new(ArangoDriver::new(&config.storage.data_path)),
    };
    Ok(driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_placeholder_drivers() {
        let temp = TempDir::new().unwrap();
        let mut config = BenchConfig::default();
        config.storage.data_path = temp.path().to_path_buf();

        for kind in [BackendKind::Neo4j, BackendKind::ArangoDb] {
            let driver = open_driver(kind, &config).unwrap();
            assert_eq!(driver.kind(), kind);
        }
    }

    #[test]
    fn test_open_millennium_checks_binaries() {
        let temp = TempDir::new().unwrap();
        let mut config = BenchConfig::default();
        config.storage.data_path = temp.path().join("data");
        config.millennium.create_db_path = temp.path().join("nope");

        let err = open_driver(BackendKind::MillenniumDb, &config).err().unwrap();
        assert!(matches!(err, BackendError::Configuration(_)));
    }

    #[test]
    fn test_open_millennium() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("create_db"), "").unwrap();
        std::fs::write(temp.path().join("server"), "").unwrap();

        let mut config = BenchConfig::default();
        config.storage.data_path = temp.path().join("data");
        config.millennium.create_db_path = temp.path().join("create_db");
        config.millennium.server_path = temp.path().join("server");

        let driver = open_driver(BackendKind::MillenniumDb, &config).unwrap();
        assert_eq!(driver.kind(), BackendKind::MillenniumDb);
        assert!(temp.path().join("data").is_dir());
    }
}
