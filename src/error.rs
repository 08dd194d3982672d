//! Loader error types

use std::fmt;
use std::path::PathBuf;

/// Error type for staging load operations
//
// Display and Error are implemented by hand because the `source` fields
// name a logical data source, not an underlying error; thiserror's derive
// would infer them as `Error::source()`.
#[derive(Debug)]
pub enum LoaderError {
    /// Configuration is missing or malformed
    Config(String),

    /// One or more configured source files are absent.
    ///
    /// Raised by the pre-flight check before any database work begins, and
    /// carries every absent source so a single failure reports the full set.
    MissingSource(Vec<(String, PathBuf)>),

    /// A source header names the same column twice
    DuplicateColumn { source: String, column: String },

    /// The header row of a source could not be read
    Header { source: String, reason: String },

    /// The database could not be reached or authenticated
    Connection(String),

    /// A schema statement (DROP/CREATE) was rejected
    Schema { table: String, reason: String },

    /// The bulk copy was rejected, typically by malformed CSV data
    Load {
        source: String,
        table: String,
        reason: String,
    },

    /// IO error
    Io(String),
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Config(msg) => write!(f, "Configuration error: {}", msg),
            LoaderError::MissingSource(missing) => {
                write!(f, "Missing source files: {}", format_missing(missing))
            }
            LoaderError::DuplicateColumn { source, column } => {
                write!(f, "Duplicate column {:?} in header of source '{}'", column, source)
            }
            LoaderError::Header { source, reason } => {
                write!(f, "Failed to read header of source '{}': {}", source, reason)
            }
            LoaderError::Connection(msg) => write!(f, "Connection failed: {}", msg),
            LoaderError::Schema { table, reason } => {
                write!(f, "Schema statement rejected for {}: {}", table, reason)
            }
            LoaderError::Load { source, table, reason } => {
                write!(f, "Bulk copy into {} rejected for source '{}': {}", table, source, reason)
            }
            LoaderError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for LoaderError {}

/// Result type for staging load operations
pub type LoaderResult<T> = Result<T, LoaderError>;

fn format_missing(missing: &[(String, PathBuf)]) -> String {
    missing
        .iter()
        .map(|(name, path)| format!("{} ({})", name, path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_lists_every_entry() {
        let err = LoaderError::MissingSource(vec![
            ("results".to_string(), PathBuf::from("/data/raw/results.csv")),
            ("picks".to_string(), PathBuf::from("/data/raw/picks.csv")),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("results (/data/raw/results.csv)"));
        assert!(msg.contains("picks (/data/raw/picks.csv)"));
    }

    #[test]
    fn test_load_error_names_source_and_table() {
        let err = LoaderError::Load {
            source: "economy".to_string(),
            table: "staging.economy".to_string(),
            reason: "extra data after last expected column".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("economy"));
        assert!(msg.contains("staging.economy"));
    }
}
