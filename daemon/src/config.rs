//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use lattice_ledger::LedgerConstants;
use lattice_store_lmdb::LmdbConfig;
use lattice_types::NetworkId;
use lattice_work::WorkThresholds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid work_base_threshold '{0}': expected 16 hex digits")]
    WorkThreshold(String),

    #[error("{0}")]
    LogFormat(String),
}

/// Settings for a ledger data directory.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upper bound of the memory map, in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: u64,

    #[serde(default = "default_lmdb_max_dbs")]
    pub lmdb_max_dbs: u32,

    /// "trace", "debug", "info", "warn" or "error", or a full filter.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Base work threshold as hex, replacing the network's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_base_threshold: Option<String>,
}

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./lattice_data")
}

fn default_lmdb_map_size() -> u64 {
    LmdbConfig::default().map_size as u64
}

fn default_lmdb_max_dbs() -> u32 {
    LmdbConfig::default().max_dbs
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

impl LedgerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn lmdb_config(&self) -> LmdbConfig {
        LmdbConfig {
            map_size: usize::try_from(self.lmdb_map_size).unwrap_or(usize::MAX),
            max_dbs: self.lmdb_max_dbs,
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        self.log_format.parse().map_err(ConfigError::LogFormat)
    }

    /// Network constants with the configured work override applied.
    pub fn ledger_constants(&self) -> Result<LedgerConstants, ConfigError> {
        let constants = LedgerConstants::for_network(self.network);
        match &self.work_base_threshold {
            None => Ok(constants),
            Some(hex) => {
                let digits = hex.trim_start_matches("0x");
                let base = u64::from_str_radix(digits, 16)
                    .map_err(|_| ConfigError::WorkThreshold(hex.clone()))?;
                Ok(constants.with_work(WorkThresholds::with_base(base)))
            }
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            data_dir: default_data_dir(),
            lmdb_map_size: default_lmdb_map_size(),
            lmdb_max_dbs: default_lmdb_max_dbs(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            work_base_threshold: None,
        }
    }
}
