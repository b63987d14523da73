// Quill API server

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quill_api::config::Config;
use quill_api::openapi::ApiDoc;
use quill_api::{build_router_with_prefix, router, AppState};
use quill_storage::{PoolConfig, StorageBackend};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();

    let db = match &config.db.url {
        Some(url) => {
            let pool = PoolConfig {
                max_connections: config.db.max_connections,
                idle_timeout: config.db.idle_timeout,
            };
            let db = StorageBackend::postgres(url, pool)
                .await
                .context("failed to connect to database")?;
            tracing::info!("connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };

    let state = AppState::new(db, &config.auth);

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let app = Router::new()
        .route("/health", get(health))
        .merge(build_router_with_prefix(router(state), &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::new(config.http.request_timeout))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.http.addr)
        .await
        .context("failed to bind to address")?;
    tracing::info!(addr = %config.http.addr, "http server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
