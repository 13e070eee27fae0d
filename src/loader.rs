//! Partition map loader.
//!
//! Reads `key<TAB>value` lines into a [`HashTable`] and reads every value
//! back immediately after inserting it. Ingestion stops quietly at the first
//! line that is not exactly two integers; everything after it is ignored.

use crate::error::LoadError;
use crate::hash_table::HashTable;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

// A conforming line is two integers and a few separators; anything longer
// is treated as non-conforming without buffering the rest of it.
const MAX_LINE_BYTES: usize = 256;

/// Summary of a completed load.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LoadReport {
    /// Pairs inserted, counting repeated keys once per line.
    pub loaded: usize,
    /// 1-based line number of the first non-conforming line, if ingestion
    /// stopped before end of input.
    pub truncated_at: Option<usize>,
}

/// Loads the partition map file at `path` into `table`.
pub fn load_partition_map(path: &Path, table: &mut HashTable) -> Result<LoadReport, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let report = load_from_reader(BufReader::new(file), table)?;
    tracing::info!(
        loaded = report.loaded,
        truncated_at = report.truncated_at,
        path = %path.display(),
        "loaded partition map"
    );
    Ok(report)
}

/// Loads `key<TAB>value` lines from `reader` into `table`.
///
/// Blank lines are skipped. A read-back mismatch returns
/// [`LoadError::ConsistencyViolation`] and leaves the table partially
/// filled; callers must discard it.
pub fn load_from_reader<R: BufRead>(
    mut reader: R,
    table: &mut HashTable,
) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        line_no += 1;
        let n = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)
            .map_err(|source| LoadError::Read {
                line: line_no,
                source,
            })?;
        if n == 0 {
            break;
        }
        if n > MAX_LINE_BYTES {
            report.truncated_at = Some(line_no);
            break;
        }

        let Ok(line) = std::str::from_utf8(&buf) else {
            report.truncated_at = Some(line_no);
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = parse_line(line) else {
            report.truncated_at = Some(line_no);
            break;
        };

        table
            .put(key, value)
            .map_err(|source| LoadError::Table { key, source })?;
        verify_read_back(table, key, value)?;
        report.loaded += 1;
    }

    if let Some(line) = report.truncated_at {
        tracing::debug!(
            line,
            loaded = report.loaded,
            "partition map ingestion stopped at non-conforming line"
        );
    }
    Ok(report)
}

fn verify_read_back(table: &HashTable, key: i64, expected: u32) -> Result<(), LoadError> {
    let found = table.get(key);
    if found != Some(expected) {
        return Err(LoadError::ConsistencyViolation {
            key,
            expected,
            found,
        });
    }
    Ok(())
}

/// Exactly two whitespace-separated integers: an `i64` key and a `u32` value.
fn parse_line(line: &str) -> Option<(i64, u32)> {
    let mut fields = line.split_whitespace();
    let key = fields.next()?.parse().ok()?;
    let value = fields.next()?.parse().ok()?;
    fields.next().is_none().then_some((key, value))
}
