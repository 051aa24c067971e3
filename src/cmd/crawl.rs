use crate::modules::{contests::aggregator::ContestAggregator, migration::MIGRATOR};
use anyhow::{Context, Result};
use clap::Args;
use sqlx::{postgres::Postgres, Pool};
use std::env;

#[derive(Debug, Args)]
pub struct CrawlArgs {}

/// One-shot aggregation run over all three platforms.
pub async fn run(_args: CrawlArgs) -> Result<()> {
    let database_url: String = env::var("DATABASE_URL").with_context(|| {
        let message = "DATABASE_URL must be configured.";
        tracing::error!(message);
        message
    })?;

    let pool: Pool<Postgres> = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .with_context(|| {
            let message = "Failed to create database connection pool.";
            tracing::error!(message);
            message
        })?;

    MIGRATOR.run(&pool).await?;

    let aggregator = ContestAggregator::new(&pool);
    aggregator.run().await?;

    Ok(())
}
