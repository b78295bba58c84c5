//! API error type and the join token handler.

use crate::AppState;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use neo_voice::VoiceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("upstream failure: {0}")]
    BadGateway(String),
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Config(msg) => ApiError::BadRequest(msg),
            e @ VoiceError::SynthesisFailed { .. } => ApiError::BadGateway(e.to_string()),
            e @ VoiceError::RoomService(_) => ApiError::BadGateway(e.to_string()),
            e @ VoiceError::DecodeFailed(_) => ApiError::Unprocessable(e.to_string()),
            e @ VoiceError::Cancelled => ApiError::Conflict(e.to_string()),
            e @ VoiceError::LiveKit(_) => {
                tracing::error!("failed to sign LiveKit token: {}", e);
                ApiError::InternalServerError(e.to_string())
            }
        }
    }
}

/// Request body for `POST /api/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Stable user id; also names the user's room.
    pub identity: String,
    /// Display name shown to other participants. Defaults to the identity.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for `POST /api/token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub url: String,
    pub username: String,
    pub room_name: String,
}

/// Handler for `POST /api/token`.
///
/// Issues a LiveKit join token for the caller's personal room.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !state.voice_service.is_enabled() {
        return Err(ApiError::ServiceUnavailable(
            "LiveKit is not configured".to_string(),
        ));
    }

    let identity = payload.identity.trim();
    if identity.is_empty() {
        return Err(ApiError::BadRequest("identity is required".to_string()));
    }

    let username = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(identity)
        .to_string();

    let room_name = state.voice_service.room_for_identity(identity);
    let access_token = state
        .voice_service
        .generate_join_token(&room_name, identity, &username)?;

    tracing::info!(room = %room_name, identity, "issued join token");

    Ok(Json(TokenResponse {
        access_token,
        url: state.voice_service.get_public_url().to_string(),
        username,
        room_name,
    }))
}
