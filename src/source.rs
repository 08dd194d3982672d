//! Source descriptors and pre-flight validation
//!
//! A source is a logical name mapped to a CSV file on disk. The set is
//! fixed at startup and iteration order is insertion order, which defines
//! load order (and therefore log order, nothing more).

use std::path::{Path, PathBuf};

use crate::error::{LoaderError, LoaderResult};

/// The standard staging sources, in load order
pub const STANDARD_SOURCES: [&str; 4] = ["results", "picks", "economy", "players"];

/// A logical source name mapped to a CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Logical name; also names the staging table
    pub name: String,
    /// Path of the CSV file
    pub path: PathBuf,
}

impl Source {
    /// Create a new source descriptor
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// An insertion-ordered set of sources
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    sources: Vec<Source>,
}

impl SourceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed staging inputs: `<data_dir>/<name>.csv` for each of
    /// [`STANDARD_SOURCES`].
    pub fn standard(data_dir: &Path) -> Self {
        let mut set = Self::new();
        for name in STANDARD_SOURCES {
            set.push(Source::new(name, data_dir.join(format!("{}.csv", name))));
        }
        set
    }

    /// Append a source, preserving insertion order
    pub fn push(&mut self, source: Source) {
        self.sources.push(source);
    }

    /// Iterate sources in load order
    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    /// Number of configured sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Verify that every configured file exists before any database work.
    ///
    /// This is an atomic gate: all sources are checked and every absent one
    /// is reported in a single [`LoaderError::MissingSource`], so a failed
    /// run never leaves the database touched.
    pub fn preflight(&self) -> LoaderResult<()> {
        let missing: Vec<(String, PathBuf)> = self
            .sources
            .iter()
            .filter(|s| !s.path.is_file())
            .map(|s| (s.name.clone(), s.path.clone()))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoaderError::MissingSource(missing))
        }
    }
}
