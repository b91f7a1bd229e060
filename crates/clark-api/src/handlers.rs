//! Route handler functions.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

pub const BANNER: &str = "AI Assistant Backend is running!";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Audio identifier for `GET /audio/{id}`; `null` when synthesis failed.
    pub audio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub history_len: usize,
}

/// GET / - liveness banner.
pub async fn index() -> &'static str {
    BANNER
}

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        history_len: state.conversation.len(),
    })
}

/// POST /api/chat - run one conversation turn.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected chat body");
        ApiError::BadRequest(rejection.body_text())
    })?;
    let message = request
        .message
        .ok_or_else(|| ApiError::BadRequest("No message provided".to_string()))?;

    tracing::info!(chars = message.chars().count(), "Chat turn received");

    let outcome = state
        .dispatcher
        .handle(&message, &state.conversation)
        .await
        .map_err(|e| {
            if !e.is_validation() {
                tracing::error!(error = %e, "Chat turn failed");
            }
            ApiError::from(e)
        })?;

    Ok(Json(ChatResponse {
        response: outcome.final_text,
        audio: outcome.audio_id,
    }))
}

/// GET /audio/{id} - stream a stored MP3.
pub async fn audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.audio.load(&id).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes))
}
