use std::sync::Arc;

use anyhow::Context;
use keel_compose::DockerComposeRunner;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreBackend};
use crate::repository::{InMemoryStackStore, PgStackStore, StackStore};
use crate::state::AppState;

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
pub mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "keel_orchestrator=debug,keel_compose=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Keel Orchestrator...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    let store: Arc<dyn StackStore> = match &config.store {
        StoreBackend::Postgres(url) => {
            tracing::info!("Connecting to database...");

            let pool = db::create_pool(url)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Database connection pool created");

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Arc::new(PgStackStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, nothing will be persisted");
            Arc::new(InMemoryStackStore::new())
        }
    };

    let runner = DockerComposeRunner::new(config.compose()?);
    if let Err(e) = runner.check_available().await {
        tracing::warn!("Compose is not available, deploys will fail: {}", e);
    }

    if config.api_key.is_none() {
        tracing::warn!("KEEL_API_KEY not set, API is unauthenticated");
    }

    let state = AppState::new(store, Arc::new(runner)).with_api_key(config.api_key.clone());

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
