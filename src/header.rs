//! CSV header extraction
//!
//! Only the first record of each file is parsed here; data rows are streamed
//! verbatim to the server by the loader. Files must be UTF-8 and
//! comma-delimited with RFC 4180 quoting.

use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{LoaderError, LoaderResult};

/// Read the header row of a CSV file as an ordered list of column names.
///
/// Field order defines table column order. Empty field names are accepted;
/// a file with no header row at all is an error. Whether the file has any
/// data rows is not checked.
pub fn read_header(source: &str, path: &Path) -> LoaderResult<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| LoaderError::Header {
            source: source.to_string(),
            reason: e.to_string(),
        })?;

    let headers = reader.headers().map_err(|e| LoaderError::Header {
        source: source.to_string(),
        reason: e.to_string(),
    })?;

    if headers.is_empty() {
        return Err(LoaderError::Header {
            source: source.to_string(),
            reason: "file has no header row".to_string(),
        });
    }

    Ok(headers.iter().map(|h| h.to_string()).collect())
}

/// Reject duplicate column names before any DDL is issued.
///
/// PostgreSQL would refuse the CREATE TABLE anyway; failing here names the
/// offending column and source instead of surfacing a server error.
pub fn check_duplicates(source: &str, columns: &[String]) -> LoaderResult<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(LoaderError::DuplicateColumn {
                source: source.to_string(),
                column: column.clone(),
            });
        }
    }
    Ok(())
}
