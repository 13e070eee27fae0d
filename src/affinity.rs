//! AffinityMap: host-owned lifecycle around one loaded partition table.
//!
//! The host builds an `AffinityMap` from an [`AffinityConfig`], calls
//! [`initialize`](AffinityMap::initialize) once, answers per-row lookups with
//! [`query`](AffinityMap::query) or
//! [`get_affinity_value`](AffinityMap::get_affinity_value), and tears down
//! with [`cleanup`](AffinityMap::cleanup) (or by dropping the map).
//!
//! Lookups never fail. Misses are reported with sentinels, and the two
//! lookup paths use different ones:
//! - `query` returns [`QUERY_MISS`] for an absent key or an uninitialized map.
//! - `get_affinity_value` returns [`NULL_KEY`] when the row has no key and
//!   [`ROW_MISS`] when the key is not in the map.

use crate::config::AffinityConfig;
use crate::error::{AffinityError, LoadError};
use crate::hash_table::HashTable;
use crate::loader::{load_partition_map, LoadReport};

/// `query` result for an absent key: `-1` in the unsigned partition range.
pub const QUERY_MISS: u32 = u32::MAX;
/// `get_affinity_value` result when the row yields no key: `-1` in the unsigned range.
pub const NULL_KEY: u32 = u32::MAX;
/// `get_affinity_value` result when the row's key is not in the map.
pub const ROW_MISS: u32 = 0;

/// Extracts the affinity key from a host row.
///
/// Returns `None` when the column is null or the value cannot be read as a
/// 64-bit signed key.
pub trait RowKeyAdapter<R: ?Sized> {
    fn extract_key(&self, row: &R, column: usize) -> Option<i64>;
}

impl<R, F> RowKeyAdapter<R> for F
where
    R: ?Sized,
    F: Fn(&R, usize) -> Option<i64>,
{
    fn extract_key(&self, row: &R, column: usize) -> Option<i64> {
        self(row, column)
    }
}

/// Result of a successful [`AffinityMap::initialize`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Initialized {
    Loaded(LoadReport),
    /// The map already held a table; nothing was reloaded.
    AlreadyInitialized,
}

#[derive(Debug)]
pub struct AffinityMap {
    config: AffinityConfig,
    table: Option<HashTable>,
}

impl AffinityMap {
    pub fn new(config: AffinityConfig) -> Self {
        Self {
            config,
            table: None,
        }
    }

    pub fn config(&self) -> &AffinityConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// The loaded table, if initialized.
    pub fn table(&self) -> Option<&HashTable> {
        self.table.as_ref()
    }

    /// Builds the table from `config.map_path`.
    ///
    /// Calling this on an initialized map logs a warning and changes
    /// nothing. On error the map stays uninitialized. A read-back mismatch
    /// is returned as a fatal [`LoadError::ConsistencyViolation`], or aborts
    /// the process when `abort_on_inconsistency` is set.
    pub fn initialize(&mut self) -> Result<Initialized, AffinityError> {
        if self.table.is_some() {
            tracing::warn!("partition map already initialized");
            return Ok(Initialized::AlreadyInitialized);
        }

        let mut table = HashTable::with_capacity(self.config.initial_capacity).map_err(|e| {
            tracing::error!(error = %e, "failed to create partition map");
            e
        })?;

        match load_partition_map(&self.config.map_path, &mut table) {
            Ok(report) => {
                self.table = Some(table);
                Ok(Initialized::Loaded(report))
            }
            Err(e @ LoadError::ConsistencyViolation { .. }) => {
                tracing::error!(
                    error = %e,
                    path = %self.config.map_path.display(),
                    "partition map failed read-back check"
                );
                if self.config.abort_on_inconsistency {
                    std::process::abort();
                }
                Err(e.into())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load partition map");
                Err(e.into())
            }
        }
    }

    /// Partition for `key`, or [`QUERY_MISS`].
    pub fn query(&self, key: i64) -> u32 {
        self.table
            .as_ref()
            .and_then(|t| t.get(key))
            .unwrap_or(QUERY_MISS)
    }

    /// Partition for the key held in `row`'s configured affinity column.
    pub fn get_affinity_value<R, A>(&self, adapter: &A, row: &R) -> u32
    where
        R: ?Sized,
        A: RowKeyAdapter<R> + ?Sized,
    {
        let column = self.config.affinity_column;
        let Some(key) = adapter.extract_key(row, column) else {
            tracing::warn!(column, "affinity key column is null");
            return NULL_KEY;
        };
        let Some(table) = self.table.as_ref() else {
            tracing::warn!(key, "partition map not initialized");
            return ROW_MISS;
        };
        match table.get(key) {
            Some(value) => value,
            None => {
                tracing::warn!(key, "affinity key not found in partition map");
                ROW_MISS
            }
        }
    }

    /// Drops the table. A no-op when uninitialized.
    pub fn cleanup(&mut self) {
        self.table = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn map_with(pairs: &[(i64, u32)]) -> AffinityMap {
        let mut table = HashTable::with_capacity(8).unwrap();
        for &(k, v) in pairs {
            table.put(k, v).unwrap();
        }
        AffinityMap {
            config: AffinityConfig::new("unused"),
            table: Some(table),
        }
    }

    // Rows as column vectors; `None` is a SQL null.
    fn column_adapter(row: &[Option<i64>], column: usize) -> Option<i64> {
        row.get(column).copied().flatten()
    }

    #[test]
    fn uninitialized_query_misses() {
        let m = AffinityMap::new(AffinityConfig::new("unused"));
        assert!(!m.is_initialized());
        for k in [i64::MIN, -1, 0, 5, 999, i64::MAX] {
            assert_eq!(m.query(k), QUERY_MISS);
        }
    }

    #[test]
    fn query_hit_and_miss() {
        let m = map_with(&[(5, 10), (7, 20)]);
        assert_eq!(m.query(5), 10);
        assert_eq!(m.query(7), 20);
        assert_eq!(m.query(999), QUERY_MISS);
        assert_eq!(QUERY_MISS as i32, -1);
    }

    #[test]
    fn row_lookup_sentinels_are_distinct() {
        let m = map_with(&[(5, 10)]);
        let adapter = column_adapter;

        let hit: Vec<Option<i64>> = vec![Some(0), Some(5)];
        assert_eq!(m.get_affinity_value(&adapter, hit.as_slice()), 10);

        let null: Vec<Option<i64>> = vec![Some(5), None];
        assert_eq!(m.get_affinity_value(&adapter, null.as_slice()), NULL_KEY);
        assert_eq!(NULL_KEY as i32, -1);

        let absent: Vec<Option<i64>> = vec![Some(5), Some(6)];
        assert_eq!(m.get_affinity_value(&adapter, absent.as_slice()), ROW_MISS);
        assert_ne!(ROW_MISS, QUERY_MISS);
    }

    #[test]
    fn row_lookup_uses_configured_column() {
        let mut m = map_with(&[(42, 3)]);
        m.config.affinity_column = 0;
        let row = [Some(42i64), Some(7)];
        let adapter = |row: &[Option<i64>; 2], column: usize| row[column];
        assert_eq!(m.get_affinity_value(&adapter, &row), 3);
    }

    #[test]
    fn row_lookup_on_uninitialized_map_misses() {
        let m = AffinityMap::new(AffinityConfig::new("unused"));
        let row: Vec<Option<i64>> = vec![None, Some(5)];
        assert_eq!(m.get_affinity_value(&column_adapter, row.as_slice()), ROW_MISS);
    }

    #[derive(Clone, Default)]
    struct LogBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let buf = LogBuf::default();
        let sink = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    /// Both miss causes return `ROW_MISS` but log different reasons.
    #[test]
    fn row_miss_logs_name_the_cause() {
        let row: Vec<Option<i64>> = vec![None, Some(5)];

        let uninit = AffinityMap::new(AffinityConfig::new("unused"));
        let logs = captured_logs(|| {
            assert_eq!(uninit.get_affinity_value(&column_adapter, row.as_slice()), ROW_MISS);
        });
        assert!(logs.contains("partition map not initialized"), "{logs}");
        assert!(!logs.contains("not found"), "{logs}");

        let loaded = map_with(&[(1, 1)]);
        let logs = captured_logs(|| {
            assert_eq!(loaded.get_affinity_value(&column_adapter, row.as_slice()), ROW_MISS);
        });
        assert!(logs.contains("affinity key not found"), "{logs}");
        assert!(!logs.contains("not initialized"), "{logs}");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut m = map_with(&[(1, 1)]);
        assert!(m.is_initialized());
        m.cleanup();
        assert!(!m.is_initialized());
        assert_eq!(m.query(1), QUERY_MISS);
        m.cleanup();
        assert!(m.table().is_none());
    }
}
