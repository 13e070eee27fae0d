//! partition-affinity: routes a row's 64-bit affinity key to the partition
//! that owns it, using a chained hash map loaded once from disk.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a build-once, query-many map whose contents provably match the
//!   partition file before the first query is served.
//! - Layers:
//!   - `hash64`: the bit-exact key mixer and bucket index.
//!   - `HashTable`: `i64 -> u32` with per-bucket chains, head insertion and
//!     doubling growth at load factor 0.75.
//!   - `loader`: parses `key<TAB>value` lines, inserts each pair and reads
//!     it back before moving on.
//!   - `AffinityMap`: host-owned lifecycle (initialize, query, row lookup,
//!     cleanup) plus the `RowKeyAdapter` seam to the host's row format.
//!
//! Constraints
//! - Single-threaded and synchronous; no locks or atomics. Hosts that share
//!   a map across threads wrap it in their own lock.
//! - Entries live in a generational slot arena; chains link arena keys, so
//!   removal and resize never touch raw pointers.
//! - Growth is decided before an insert: a new key that would push the load
//!   factor past 0.75 doubles the bucket array first.
//!
//! Failure classes
//! - Allocation (bucket array, entry arena): reported as `TableError`. A
//!   failed resize is not an error; the table keeps its capacity, logs a
//!   warning and counts it in `failed_resizes()`.
//! - I/O: reported as `LoadError::{Open, Read}`.
//! - Malformed input: not an error; ingestion stops at the first
//!   non-conforming line.
//! - Read-back mismatch after insert: `LoadError::ConsistencyViolation`,
//!   the one fatal class. The table is discarded; with
//!   `abort_on_inconsistency` the process aborts.
//! - Lookup misses: sentinels, never errors.
//!
//! Notes and non-goals
//! - No persistence of writes, eviction, or rebalancing.
//! - Keys and bucket placement must match across builds reading the same
//!   file, so the mixer constants never change.

mod affinity;
mod config;
mod error;
pub mod hash64;
pub mod hash_table;
mod hash_table_proptest;
pub mod loader;

// Public surface
pub use affinity::{AffinityMap, Initialized, RowKeyAdapter, NULL_KEY, QUERY_MISS, ROW_MISS};
pub use config::{AffinityConfig, DEFAULT_AFFINITY_COLUMN, DEFAULT_INITIAL_CAPACITY};
pub use error::{AffinityError, ConfigError, LoadError, TableError};
pub use hash_table::{HashTable, Put};
pub use loader::LoadReport;
