//! Binary entry point for staging-loader

use anyhow::Result;
use staging_loader::{LoaderConfig, SourceSet, StagingLoader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = LoaderConfig::from_env()?;
    let sources = SourceSet::standard(&config.data_dir);
    info!("loading {} sources from {}", sources.len(), config.data_dir.display());

    let report = StagingLoader::new(config).run(&sources).await?;

    for table in &report.tables {
        println!("Loaded {}: {} rows", table.table, table.rows);
    }
    println!(
        "OK: staging loaded ({} tables, {} rows, {}ms)",
        report.table_count(),
        report.total_rows(),
        report.duration_ms
    );
    Ok(())
}
