//! REST API, nested under `/api`.
//!
//! Endpoints:
//!
//! - `GET  /api/brands`              : All brands
//! - `GET  /api/brands/search?q=`    : Brands matching `q` (all when empty)
//! - `GET  /api/brands/{id}`         : One brand, 404 when unknown
//! - `GET  /api/timeline`            : The timeline, passed through
//! - `POST /api/chat`                : Ask the assistant, within a session
//! - `POST /api/chat/clear`          : Forget a session's history

use axum::{
    Router,
    extract::rejection::JsonRejection,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::SharedState;
use laozihao_core::brand::{Brand, TimelineEntry};
use laozihao_core::message::Message;
use laozihao_core::session::DEFAULT_SESSION_ID;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the API router. Nest this under "/api" in the main router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/brands", get(list_brands_handler))
        .route("/brands/search", get(search_brands_handler))
        .route("/brands/{id}", get(get_brand_handler))
        .route("/timeline", get(timeline_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/clear", post(clear_chat_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    /// Omitted or empty selects the default session.
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    response: String,
    timestamp: String,
    session_id: String,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearRequest {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ClearResponse {
    message: String,
    timestamp: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            timestamp: None,
        }),
    )
}

/// Current time as RFC 3339 UTC with millisecond precision.
fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn session_or_default(session_id: Option<String>) -> String {
    session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string())
}

// ── Catalog handlers ──────────────────────────────────────────────────────

async fn list_brands_handler(State(state): State<SharedState>) -> Json<Vec<Brand>> {
    Json(state.records.list_brands())
}

async fn search_brands_handler(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Brand>> {
    let query = params.q.unwrap_or_default();
    Json(state.records.search_brands(&query))
}

async fn get_brand_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Brand>, ApiError> {
    // The whole segment must be an integer: "12abc" is not brand 12.
    id.trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| state.records.get_brand(id))
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Brand not found"))
}

async fn timeline_handler(State(state): State<SharedState>) -> Json<Vec<TimelineEntry>> {
    Json(state.records.list_timeline())
}

// ── Chat handlers ─────────────────────────────────────────────────────────

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    let Some(message) = request.message.filter(|m| !m.is_empty()) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message must not be empty"));
    };
    let session_id = session_or_default(request.session_id);

    info!(session = %session_id, message_len = message.len(), "Chat message received");

    let history = state.sessions.get(&session_id);

    match state.chat.chat(&message, &history).await {
        Ok(response) => {
            state.sessions.append(
                &session_id,
                Message::user(message),
                Message::assistant(response.clone()),
            );
            Ok(Json(ChatResponse {
                response,
                timestamp: timestamp(),
                session_id,
            }))
        }
        Err(e) => {
            error!(session = %session_id, error = %e, "Chat request failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                    timestamp: Some(timestamp()),
                }),
            ))
        }
    }
}

async fn clear_chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ClearRequest>, JsonRejection>,
) -> Json<ClearResponse> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let session_id = session_or_default(request.session_id);

    state.sessions.clear(&session_id);
    info!(session = %session_id, "Chat history cleared");

    Json(ClearResponse {
        message: "Chat history cleared".into(),
        timestamp: timestamp(),
    })
}
