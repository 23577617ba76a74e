pub mod response;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::features;
use crate::ingest::tga::{TgaApi, TgaClient};
use crate::ingest::{IngestService, IngestStore, PgIngestStore};
use crate::middleware;

#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
}

/// Connect, migrate, and serve until ctrl-c or SIGTERM
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&db::DbConfig::from(&config.database))
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let store: Arc<dyn IngestStore> = Arc::new(PgIngestStore::new(pool));

    let tga: Option<Arc<dyn TgaApi>> = match TgaClient::from_config(config.upstream.clone()) {
        Some(client) => {
            let client = client.context("Failed to build TGA client")?;
            info!(endpoint = %client.endpoint(), "TGA client initialized");
            Some(Arc::new(client))
        },
        None => None,
    };

    let ingest = IngestService::new(store, tga, config.ingest.clone())?;
    let app = create_router(AppState { ingest }, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Root, health and `/api` routes with the middleware stack
pub fn create_router(state: AppState, config: &Config) -> Router {
    let api = features::router(features::FeatureState {
        ingest: state.ingest.clone(),
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "VetLearn Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(state): State<AppState>) -> Response {
    match state.ingest.store().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "database": "connected" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "database": "disconnected" })),
            )
                .into_response()
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }

    // Running download jobs are not persisted; they end with the process
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
