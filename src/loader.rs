//! Staging load run loop
//!
//! Connects once, creates the staging schema, then per source (in
//! configured order):
//! - reads the CSV header to determine column names
//! - drops and recreates `staging.<source>` with one TEXT column per field
//! - streams the whole file through the COPY protocol
//! - records the resulting row count
//!
//! Everything is sequential on a single connection. Statements run
//! autocommitted; on the first error the run aborts and tables loaded by
//! earlier sources remain in place.

use std::time::Instant;

use bytes::BytesMut;
use futures_util::{SinkExt, pin_mut};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio_postgres::Client;
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::header::{check_duplicates, read_header};
use crate::source::{Source, SourceSet};
use crate::sql;

/// Read size for streaming a source file into the COPY sink
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// One loaded table in a run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLoad {
    /// Logical source name
    pub source: String,
    /// Qualified staging table name
    pub table: String,
    /// Rows loaded (data rows; the header is not counted)
    pub rows: u64,
}

/// Result of a staging run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Per-table loads, in load order
    pub tables: Vec<TableLoad>,
    /// Duration of the run in milliseconds
    pub duration_ms: u64,
}

impl LoadReport {
    /// Total rows loaded across all tables
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Number of tables loaded
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// Header-driven CSV to PostgreSQL staging loader
pub struct StagingLoader {
    config: LoaderConfig,
}

impl StagingLoader {
    /// Create a loader for the given configuration
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load every configured source into the staging schema.
    ///
    /// All source files are validated up front; no statement is issued if
    /// any file is absent. The connection is owned by this call and released
    /// on every exit path.
    pub async fn run(&self, sources: &SourceSet) -> LoaderResult<LoadReport> {
        sources.preflight()?;

        let start = Instant::now();

        let (client, connection) = self
            .config
            .pg_config()
            .connect(tokio_postgres::NoTls)
            .await
            .map_err(|e| LoaderError::Connection(e.to_string()))?;

        // Drive the connection until the client is dropped below, on
        // success and failure paths alike.
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("connection terminated: {}", e);
            }
        });

        let result = self.run_on(&client, sources).await;

        drop(client);
        let _ = driver.await;

        let mut report = result?;
        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    async fn run_on(&self, client: &Client, sources: &SourceSet) -> LoaderResult<LoadReport> {
        client
            .batch_execute(&sql::create_schema())
            .await
            .map_err(|e| LoaderError::Schema {
                table: sql::STAGING_SCHEMA.to_string(),
                reason: e.to_string(),
            })?;

        let mut report = LoadReport::default();
        for source in sources.iter() {
            let load = self.load_source(client, source).await?;
            info!("loaded {}: {} rows", load.table, load.rows);
            report.tables.push(load);
        }
        Ok(report)
    }

    async fn load_source(&self, client: &Client, source: &Source) -> LoaderResult<TableLoad> {
        let columns = read_header(&source.name, &source.path)?;
        check_duplicates(&source.name, &columns)?;

        let table = sql::qualified_name(&source.name);
        debug!("recreating {} with {} columns", table, columns.len());

        for statement in [
            sql::drop_table(&source.name),
            sql::create_table(&source.name, &columns),
        ] {
            client
                .batch_execute(&statement)
                .await
                .map_err(|e| LoaderError::Schema {
                    table: table.clone(),
                    reason: e.to_string(),
                })?;
        }

        self.copy_file(client, source, &table, &columns).await?;

        let row = client
            .query_one(sql::count_rows(&source.name).as_str(), &[])
            .await
            .map_err(|e| LoaderError::Load {
                source: source.name.clone(),
                table: table.clone(),
                reason: e.to_string(),
            })?;
        let rows: i64 = row.get(0);

        Ok(TableLoad {
            source: source.name.clone(),
            table,
            rows: rows as u64,
        })
    }

    /// Stream the whole file, header line included, into the table. The
    /// COPY statement carries `HEADER true`, so the server skips the first
    /// line; everything else is loaded without per-row round trips.
    async fn copy_file(
        &self,
        client: &Client,
        source: &Source,
        table: &str,
        columns: &[String],
    ) -> LoaderResult<()> {
        let load_err = |reason: String| LoaderError::Load {
            source: source.name.clone(),
            table: table.to_string(),
            reason,
        };

        let sink = client
            .copy_in(sql::copy_from_stdin(&source.name, columns).as_str())
            .await
            .map_err(|e| load_err(e.to_string()))?;
        pin_mut!(sink);

        let mut file = tokio::fs::File::open(&source.path)
            .await
            .map_err(|e| LoaderError::Io(format!("{}: {}", source.path.display(), e)))?;

        let mut buf = BytesMut::with_capacity(COPY_CHUNK_SIZE);
        loop {
            buf.reserve(COPY_CHUNK_SIZE);
            let n = file
                .read_buf(&mut buf)
                .await
                .map_err(|e| LoaderError::Io(format!("{}: {}", source.path.display(), e)))?;
            if n == 0 {
                break;
            }
            sink.send(buf.split().freeze())
                .await
                .map_err(|e| load_err(e.to_string()))?;
        }

        // finish() is where malformed CSV (ragged rows, bad quoting) is
        // rejected by the server; the table stays empty in that case.
        sink.finish().await.map_err(|e| load_err(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let report = LoadReport {
            tables: vec![
                TableLoad {
                    source: "results".to_string(),
                    table: "staging.results".to_string(),
                    rows: 3,
                },
                TableLoad {
                    source: "picks".to_string(),
                    table: "staging.picks".to_string(),
                    rows: 7,
                },
            ],
            duration_ms: 12,
        };
        assert_eq!(report.table_count(), 2);
        assert_eq!(report.total_rows(), 10);
    }

    #[test]
    fn test_empty_report() {
        let report = LoadReport::default();
        assert_eq!(report.table_count(), 0);
        assert_eq!(report.total_rows(), 0);
    }
}
