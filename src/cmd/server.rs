use crate::modules::{
    handlers::{add_solution, force_refresh, list_contests, liveness, readiness},
    migration::MIGRATOR,
    scheduler,
};
use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::header::CONTENT_TYPE,
    routing, Router, Server,
};
use clap::Args;
use sqlx::{postgres::Postgres, Pool};
use std::{env, net::SocketAddr};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs) -> Result<()> {
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

    // Process-lifetime timers: aggregation fires immediately and then every
    // two hours, enrichment after a short startup delay and then every six.
    scheduler::start_aggregation(pool.clone());
    match env::var("YOUTUBE_API_KEY") {
        Ok(api_key) => {
            scheduler::start_enrichment(pool.clone(), api_key);
        }
        Err(_) => {
            tracing::warn!(
                "YOUTUBE_API_KEY environment variable is not set. Video link enrichment will not run."
            );
        }
    }

    let app = create_router(pool);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to bind server.");

    Ok(())
}

fn create_router(pool: Pool<Postgres>) -> Router {
    let origin = env::var("FRONTEND_ORIGIN_URL").unwrap_or_else(|_| {
        tracing::warn!("FRONTEND_ORIGIN_URL environment variable is not set. Default value `http://localhost:5173` will be used.");
        String::from("http://localhost:5173")
    });

    Router::new()
        .route("/api/contests", routing::get(list_contests))
        .route("/api/contests/solution", routing::post(add_solution))
        .route("/api/contests/refresh", routing::post(force_refresh))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .layer(Extension(pool))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin.parse().unwrap()))
                .allow_methods(Any)
                .allow_headers(vec![CONTENT_TYPE]),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("SIGINT signal received, starting graceful shutdown.");
}
