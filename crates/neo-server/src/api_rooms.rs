//! Agent voice session handlers, one session per LiveKit room.

use crate::{api::ApiError, publisher::spawn_frame_publisher, AppState};
use axum::{
    extract::{Extension, Path},
    Json,
};
use neo_types::Locale;
use neo_voice::{AgentVoiceSession, SynthesisReport};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Response body for session start.
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentSessionResponse {
    pub room_name: String,
    pub voice_id: String,
    /// `false` when the room already had a session.
    pub created: bool,
}

/// Request body for `PUT /api/rooms/{room}/voice`.
#[derive(Debug, Deserialize)]
pub struct ChangeVoiceRequest {
    pub voice_id: String,
}

/// Request body for `POST /api/rooms/{room}/speak`.
#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

/// Response body for a completed utterance.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakResponse {
    pub request_id: String,
    pub voice_id: String,
    pub locale: Locale,
    pub frames: usize,
    pub pcm_bytes: usize,
}

impl From<SynthesisReport> for SpeakResponse {
    fn from(report: SynthesisReport) -> Self {
        Self {
            request_id: report.request_id,
            voice_id: report.voice_id,
            locale: report.locale,
            frames: report.frames,
            pcm_bytes: report.pcm_bytes,
        }
    }
}

/// Response body for `GET /api/rooms/{room}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomStatusResponse {
    pub room_name: String,
    pub participants: u32,
    pub agent_active: bool,
    /// Voice of the agent session, if there is one.
    pub voice_id: Option<String>,
}

/// Generic `{message}` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn lookup_session(state: &AppState, room: &str) -> Result<Arc<AgentVoiceSession>, ApiError> {
    let sessions = state
        .voice_sessions
        .read()
        .map_err(|_| ApiError::InternalServerError("voice_sessions lock poisoned".to_string()))?;
    sessions
        .get(room)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("no agent session in room {}", room)))
}

fn remove_session(state: &AppState, room: &str) -> Result<Option<Arc<AgentVoiceSession>>, ApiError> {
    let mut sessions = state
        .voice_sessions
        .write()
        .map_err(|_| ApiError::InternalServerError("voice_sessions lock poisoned".to_string()))?;
    Ok(sessions.remove(room))
}

/// Handler for `POST /api/rooms/{room}/agent`.
///
/// Starts the agent's voice in `room` and the publisher draining its frames.
/// Starting a room that already has a session returns that session.
pub async fn start_agent_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<AgentSessionResponse>, ApiError> {
    let tts = state
        .tts_service
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("speech synthesis is not configured".to_string()))?;

    let mut sessions = state
        .voice_sessions
        .write()
        .map_err(|_| ApiError::InternalServerError("voice_sessions lock poisoned".to_string()))?;

    match sessions.entry(room.clone()) {
        Entry::Occupied(entry) => Ok(Json(AgentSessionResponse {
            room_name: room,
            voice_id: entry.get().current_voice(),
            created: false,
        })),
        Entry::Vacant(entry) => {
            let (session, frames) =
                AgentVoiceSession::connect(&room, tts, &state.default_voice_id);
            // The publisher outlives this handler and stops when the session is closed or dropped.
            spawn_frame_publisher(room.clone(), frames, session.cancel_flag().clone());
            let voice_id = session.current_voice();
            entry.insert(Arc::new(session));

            Ok(Json(AgentSessionResponse {
                room_name: room,
                voice_id,
                created: true,
            }))
        }
    }
}

/// Handler for `DELETE /api/rooms/{room}/agent`.
pub async fn stop_agent_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = remove_session(&state, &room)?
        .ok_or_else(|| ApiError::NotFound(format!("no agent session in room {}", room)))?;
    session.close();

    Ok(Json(MessageResponse {
        message: format!("Agent left room {}", room),
    }))
}

/// Handler for `PUT /api/rooms/{room}/voice`.
///
/// Takes effect from the next utterance; one already being spoken keeps its
/// voice.
pub async fn change_voice_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
    Json(payload): Json<ChangeVoiceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = lookup_session(&state, &room)?;
    session.set_voice(&payload.voice_id)?;

    Ok(Json(MessageResponse {
        message: format!("Voice changed to {}", session.current_voice()),
    }))
}

/// Handler for `POST /api/rooms/{room}/speak`.
///
/// Returns once every frame of the utterance has been handed to the room's
/// publisher.
pub async fn speak_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
    Json(payload): Json<SpeakRequest>,
) -> Result<Json<SpeakResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text is required".to_string()));
    }

    let session = lookup_session(&state, &room)?;
    let report = session.say(&payload.text).await?;
    Ok(Json(report.into()))
}

/// Handler for `GET /api/rooms/{room}`.
pub async fn room_status_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<RoomStatusResponse>, ApiError> {
    let session = lookup_session(&state, &room).ok();

    let participants = if state.voice_service.is_enabled() {
        state.voice_service.participant_count(&room).await?
    } else {
        0
    };

    Ok(Json(RoomStatusResponse {
        room_name: room,
        participants,
        agent_active: session.as_ref().is_some_and(|s| !s.is_closed()),
        voice_id: session.map(|s| s.current_voice()),
    }))
}

/// Handler for `DELETE /api/rooms/{room}`.
///
/// Closes the agent session if there is one, then deletes the LiveKit room,
/// disconnecting every participant.
pub async fn delete_room_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(session) = remove_session(&state, &room)? {
        session.close();
    }

    if !state.voice_service.is_enabled() {
        return Err(ApiError::ServiceUnavailable(
            "LiveKit is not configured".to_string(),
        ));
    }

    state.voice_service.delete_room(&room).await.map_err(|e| {
        tracing::warn!(room = %room, "failed to delete room: {}", e);
        ApiError::from(e)
    })?;
    tracing::info!(room = %room, "room deleted");

    Ok(Json(MessageResponse {
        message: format!("Room {} deleted", room),
    }))
}
