//! CSV to PostgreSQL staging loader
//!
//! Loads a fixed set of raw match CSV files into a `staging` schema:
//! - column names are inferred from each file's header row
//! - tables are dropped and recreated with unconstrained TEXT columns on
//!   every run (disposable landing tables, never updated in place)
//! - rows are streamed through the COPY protocol, never inserted row by row
//! - the loaded row count is reported per table
//!
//! Source files are validated before any database work begins, and header
//! text is treated as untrusted input when assembling identifiers.

pub mod config;
pub mod error;
pub mod header;
pub mod loader;
pub mod source;
pub mod sql;

// Re-export commonly used types
pub use config::LoaderConfig;
pub use error::{LoaderError, LoaderResult};
pub use loader::{LoadReport, StagingLoader, TableLoad};
pub use source::{Source, SourceSet};
