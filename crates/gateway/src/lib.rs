//! HTTP gateway for Laozihao.
//!
//! Exposes the brand catalog, the timeline and the chat proxy as JSON
//! endpoints under `/api`, plus a `/health` probe. When the configured static
//! directory exists, its files are served for every other path.
//!
//! Built on Axum.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use laozihao_agent::ChatService;
use laozihao_config::AppConfig;
use laozihao_core::session::SessionStore;
use laozihao_store::{InMemorySessionStore, RecordStore};

/// Shared application state.
pub struct AppState {
    pub records: Arc<RecordStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub chat: Arc<ChatService>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire every component from the configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let records = Arc::new(RecordStore::new(&config.data_dir));
        let provider = laozihao_providers::build_from_config(config);
        let chat = Arc::new(ChatService::from_config(provider, records.clone(), config));
        let sessions = Arc::new(InMemorySessionStore::new(
            config.sessions.history_limit,
            config.sessions.max_sessions,
        ));

        Self {
            records,
            sessions,
            chat,
        }
    }
}

/// Build the full router.
///
/// Layers applied:
/// - permissive CORS (the frontend may be hosted elsewhere)
/// - request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api::api_router(state));

    if let Some(dir) = static_dir {
        info!(dir = %dir.display(), "Serving static files");
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the HTTP server and run until it fails.
pub async fn start(config: AppConfig) -> laozihao_core::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState::from_config(&config));
    let static_dir = config
        .server
        .static_dir
        .is_dir()
        .then(|| config.server.static_dir.clone());

    let app = build_router(state, static_dir);

    info!(addr = %addr, data_dir = %config.data_dir.display(), "Laozihao server starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
