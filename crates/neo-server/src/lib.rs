//! neo-nomad server library logic.

pub mod api;
pub mod api_rooms;
pub mod config;
pub mod publisher;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use neo_voice::{AgentVoiceSession, TtsService, VoiceService};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
pub struct AppState {
    /// LiveKit token issuance and room management.
    pub voice_service: Arc<VoiceService>,
    /// Speech synthesis. `None` when no provider key is configured.
    pub tts_service: Option<Arc<TtsService>>,
    /// Voice every new agent session starts with.
    pub default_voice_id: String,
    /// Active agent voice sessions (room name -> session).
    ///
    /// A synchronous lock is enough: acquisitions are brief map operations
    /// and never span an `.await`.
    pub voice_sessions: RwLock<HashMap<String, Arc<AgentVoiceSession>>>,
}

impl AppState {
    pub fn new(
        voice_service: VoiceService,
        tts_service: Option<TtsService>,
        default_voice_id: impl Into<String>,
    ) -> Self {
        Self {
            voice_service: Arc::new(voice_service),
            tts_service: tts_service.map(Arc::new),
            default_voice_id: default_voice_id.into(),
            voice_sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Closes every agent session. Used on shutdown.
    pub fn close_all_sessions(&self) {
        let drained: Vec<_> = match self.voice_sessions.write() {
            Ok(mut sessions) => sessions.drain().map(|(_, s)| s).collect(),
            Err(e) => {
                tracing::error!("voice_sessions RwLock poisoned during shutdown: {}", e);
                return;
            }
        };
        for session in drained {
            session.close();
        }
    }
}

/// Maximum request body size (64 KiB). Utterance text is the largest body.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/token", post(api::token_handler))
        .route(
            "/api/rooms/{room}/agent",
            post(api_rooms::start_agent_handler).delete(api_rooms::stop_agent_handler),
        )
        .route(
            "/api/rooms/{room}/voice",
            put(api_rooms::change_voice_handler),
        )
        .route("/api/rooms/{room}/speak", post(api_rooms::speak_handler))
        .route(
            "/api/rooms/{room}",
            get(api_rooms::room_status_handler).delete(api_rooms::delete_room_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(state))
}
