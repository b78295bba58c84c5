mod common;

use axum::http::StatusCode;
use common::{
    livekit_config, send, start_livekit, start_provider, state_with, tts_service, wav_bytes,
};
use serde_json::json;

#[tokio::test]
async fn test_start_agent_requires_tts() {
    let state = state_with(livekit_config(), None);
    let (status, _) = send(&state, "POST", "/api/rooms/neo-nomad-a/agent", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_start_agent_is_idempotent() {
    let provider = start_provider(StatusCode::OK, wav_bytes(960)).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));

    let (status, body) = send(&state, "POST", "/api/rooms/neo-nomad-a/agent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);
    assert_eq!(body["voice_id"], "en-US-zion");

    let (status, body) = send(&state, "POST", "/api/rooms/neo-nomad-a/agent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);
    assert_eq!(state.voice_sessions.read().unwrap().len(), 1);
}

#[tokio::test]
async fn test_change_voice_unknown_room_is_404() {
    let state = state_with(livekit_config(), None);
    let (status, _) = send(
        &state,
        "PUT",
        "/api/rooms/neo-nomad-missing/voice",
        Some(json!({ "voice_id": "en-US-natalie" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_change_voice_then_speak() {
    let provider = start_provider(StatusCode::OK, wav_bytes(1000)).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-b/agent", None).await;

    let (status, body) = send(
        &state,
        "PUT",
        "/api/rooms/neo-nomad-b/voice",
        Some(json!({ "voice_id": "en-US-natalie" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Voice changed to en-US-natalie");

    let (status, body) = send(
        &state,
        "POST",
        "/api/rooms/neo-nomad-b/speak",
        Some(json!({ "text": "Hello\n  traveller" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["voice_id"], "en-US-natalie");
    assert_eq!(body["locale"], "en-US");
    assert_eq!(body["frames"], 3);
    assert_eq!(body["pcm_bytes"], 2000);
    assert!(!body["request_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_voice_is_rejected() {
    let provider = start_provider(StatusCode::OK, wav_bytes(480)).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-c/agent", None).await;

    let (status, _) = send(
        &state,
        "PUT",
        "/api/rooms/neo-nomad-c/voice",
        Some(json!({ "voice_id": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speak_unknown_room_is_404() {
    let state = state_with(livekit_config(), None);
    let (status, _) = send(
        &state,
        "POST",
        "/api/rooms/neo-nomad-missing/speak",
        Some(json!({ "text": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_speak_empty_text_is_400() {
    let provider = start_provider(StatusCode::OK, wav_bytes(480)).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-d/agent", None).await;

    let (status, _) = send(
        &state,
        "POST",
        "/api/rooms/neo-nomad-d/speak",
        Some(json!({ "text": " \n " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_failure_is_502() {
    let provider = start_provider(StatusCode::INTERNAL_SERVER_ERROR, b"nope".to_vec()).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-e/agent", None).await;

    let (status, body) = send(
        &state,
        "POST",
        "/api/rooms/neo-nomad-e/speak",
        Some(json!({ "text": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("synthesis failed"));
}

#[tokio::test]
async fn test_undecodable_payload_is_422() {
    let provider = start_provider(StatusCode::OK, b"not audio at all".to_vec()).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-f/agent", None).await;

    let (status, _) = send(
        &state,
        "POST",
        "/api/rooms/neo-nomad-f/speak",
        Some(json!({ "text": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_stop_agent() {
    let provider = start_provider(StatusCode::OK, wav_bytes(480)).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-g/agent", None).await;

    let session = state
        .voice_sessions
        .read()
        .unwrap()
        .get("neo-nomad-g")
        .cloned()
        .expect("session");

    let (status, body) = send(&state, "DELETE", "/api/rooms/neo-nomad-g/agent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Agent left room neo-nomad-g");
    assert!(session.is_closed());

    let (status, _) = send(&state, "DELETE", "/api/rooms/neo-nomad-g/agent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_room_closes_session_even_if_livekit_is_down() {
    let provider = start_provider(StatusCode::OK, wav_bytes(480)).await;
    let state = state_with(livekit_config(), Some(tts_service(&provider)));
    send(&state, "POST", "/api/rooms/neo-nomad-h/agent", None).await;

    let (status, _) = send(&state, "DELETE", "/api/rooms/neo-nomad-h", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(state.voice_sessions.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_room_status_reports_agent_voice() {
    let provider = start_provider(StatusCode::OK, wav_bytes(480)).await;
    let livekit = start_livekit(
        StatusCode::NOT_FOUND,
        r#"{"code":"not_found","msg":"requested room does not exist"}"#,
    )
    .await;
    let state = state_with(livekit, Some(tts_service(&provider)));

    let (status, body) = send(&state, "GET", "/api/rooms/neo-nomad-i", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_active"], false);
    assert!(body["voice_id"].is_null());
    // A room LiveKit has not created yet has nobody in it.
    assert_eq!(body["participants"], 0);

    send(&state, "POST", "/api/rooms/neo-nomad-i/agent", None).await;
    send(
        &state,
        "PUT",
        "/api/rooms/neo-nomad-i/voice",
        Some(json!({ "voice_id": "en-US-terrell" })),
    )
    .await;

    let (status, body) = send(&state, "GET", "/api/rooms/neo-nomad-i", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room_name"], "neo-nomad-i");
    assert_eq!(body["agent_active"], true);
    assert_eq!(body["voice_id"], "en-US-terrell");
}

#[tokio::test]
async fn test_room_status_of_empty_room() {
    let livekit = start_livekit(StatusCode::OK, "").await;
    let state = state_with(livekit, None);

    let (status, body) = send(&state, "GET", "/api/rooms/neo-nomad-j", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["participants"], 0);
    assert_eq!(body["agent_active"], false);
}

#[tokio::test]
async fn test_room_status_with_livekit_down_is_502() {
    let state = state_with(livekit_config(), None);

    let (status, body) = send(&state, "GET", "/api/rooms/neo-nomad-k", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("Room service error"));
}

#[tokio::test]
async fn test_room_status_with_rejected_credentials_is_502() {
    let livekit = start_livekit(
        StatusCode::UNAUTHORIZED,
        r#"{"code":"unauthenticated","msg":"invalid token"}"#,
    )
    .await;
    let state = state_with(livekit, None);

    let (status, _) = send(&state, "GET", "/api/rooms/neo-nomad-l", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
