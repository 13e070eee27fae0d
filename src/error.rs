//! Error types for each layer of the affinity map.
//!
//! Table errors are allocation-class failures, load errors add I/O and the
//! read-back consistency check, and `AffinityError` wraps both for the
//! host-facing lifecycle.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the chained hash table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("hash table capacity must be non-zero")]
    ZeroCapacity,
    #[error("failed to allocate {capacity} buckets")]
    BucketAllocation { capacity: usize },
    #[error("entry arena is full ({len} entries); value for key {key} not stored")]
    EntryLimit { key: i64, len: usize },
}

/// Failures while loading a partition map file into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open partition map file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read partition map at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("insert of key {key} failed: {source}")]
    Table {
        key: i64,
        #[source]
        source: TableError,
    },
    /// The value read back right after an insert differs from the value written.
    #[error("read-back mismatch after inserting key {key}: wrote {expected}, read {found:?}")]
    ConsistencyViolation {
        key: i64,
        expected: u32,
        found: Option<u32>,
    },
}

impl LoadError {
    /// Whether the table can no longer be trusted. Hosts must not serve
    /// queries from a table whose load ended with a fatal error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoadError::ConsistencyViolation { .. })
    }
}

/// Errors surfaced by [`AffinityMap::initialize`](crate::AffinityMap::initialize).
#[derive(Debug, Error)]
pub enum AffinityError {
    #[error("failed to create partition map: {0}")]
    Table(#[from] TableError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl AffinityError {
    pub fn is_fatal(&self) -> bool {
        match self {
            AffinityError::Load(e) => e.is_fatal(),
            AffinityError::Table(_) => false,
        }
    }
}

/// Errors reading or validating an [`AffinityConfig`](crate::AffinityConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
