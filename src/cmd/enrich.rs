use crate::modules::{migration::MIGRATOR, solutions::enricher::SolutionEnricher};
use anyhow::{Context, Result};
use clap::Args;
use sqlx::{postgres::Postgres, Pool};
use std::env;

#[derive(Debug, Args)]
pub struct EnrichArgs {}

/// One-shot video link enrichment run over finished, unlinked contests.
pub async fn run(_args: EnrichArgs) -> Result<()> {
    let database_url: String = env::var("DATABASE_URL").with_context(|| {
        let message = "DATABASE_URL must be configured.";
        tracing::error!(message);
        message
    })?;

    let api_key: String = env::var("YOUTUBE_API_KEY").with_context(|| {
        let message = "YOUTUBE_API_KEY must be configured.";
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

    let enricher = SolutionEnricher::new(&pool, api_key);
    enricher.run().await?;

    Ok(())
}
