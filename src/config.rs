//! Configuration for the affinity map.
//!
//! ```toml
//! # Partition map file: one `key<TAB>value` pair per line
//! map_path = "/var/lib/affinity/partition_map.txt"
//!
//! # Buckets allocated before loading (default: 20480)
//! initial_capacity = 20480
//!
//! # Row column holding the affinity key (default: 1)
//! affinity_column = 1
//!
//! # Abort the process when a loaded value fails to read back (default: false)
//! abort_on_inconsistency = false
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_INITIAL_CAPACITY: usize = 20480;
pub const DEFAULT_AFFINITY_COLUMN: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AffinityConfig {
    /// Partition map file loaded by `initialize`.
    pub map_path: PathBuf,

    /// Bucket count of the table created by `initialize`. Must be non-zero.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Column index passed to the row adapter by `get_affinity_value`.
    #[serde(default = "default_affinity_column")]
    pub affinity_column: usize,

    /// When set, a read-back mismatch during load aborts the process
    /// instead of being returned as an error.
    #[serde(default)]
    pub abort_on_inconsistency: bool,
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

fn default_affinity_column() -> usize {
    DEFAULT_AFFINITY_COLUMN
}

impl AffinityConfig {
    /// Config for `map_path` with every other setting at its default.
    pub fn new(map_path: impl Into<PathBuf>) -> Self {
        Self {
            map_path: map_path.into(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            affinity_column: DEFAULT_AFFINITY_COLUMN,
            abort_on_inconsistency: false,
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_affinity_column(mut self, affinity_column: usize) -> Self {
        self.affinity_column = affinity_column;
        self
    }

    pub fn with_abort_on_inconsistency(mut self, abort: bool) -> Self {
        self.abort_on_inconsistency = abort;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::Invalid(
                "initial_capacity must be greater than zero".into(),
            ));
        }
        if self.map_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("map_path must not be empty".into()));
        }
        Ok(())
    }
}
