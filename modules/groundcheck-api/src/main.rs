use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use groundcheck_common::Config;
use groundcheck_scout::FactCheckPipeline;

mod chat;
mod rest;
mod session;

use session::{SessionStore, SESSION_TTL};

/// How often idle sessions are swept.
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

pub struct AppState {
    pub pipeline: FactCheckPipeline,
    pub sessions: SessionStore,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/analyze", post(rest::api_analyze))
        .route("/api/messages", post(rest::api_messages))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Verdicts are per request; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path + status + latency only (no bodies)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("groundcheck=info".parse()?))
        .init();

    let config = Config::from_env()?;
    let pipeline = FactCheckPipeline::from_config(&config)?;

    let state = Arc::new(AppState {
        pipeline,
        sessions: SessionStore::new(SESSION_TTL),
    });

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sessions.prune().await;
        }
    });

    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!(
        session_ttl_secs = state.sessions.ttl().as_secs(),
        "groundcheck API starting on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
