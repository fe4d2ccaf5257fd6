// SPDX-License-Identifier: MIT

//! liftlog API Server
//!
//! Fitness training backend: exercise catalog, workout templates,
//! multi-day splits, and workout sessions with recorded performance.

use liftlog::{
    config::{Config, StoreBackend},
    db::DocumentStore,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting liftlog API");

    let store = match config.store_backend {
        StoreBackend::Firestore => {
            DocumentStore::firestore(&config.gcp_project_id, config.store_timeout)
                .await
                .expect("Failed to connect to Firestore")
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data will not persist");
            DocumentStore::memory()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store));

    let app = liftlog::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("liftlog=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
