#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use neo_server::AppState;
use neo_types::AudioEncoding;
use neo_voice::{LiveKitConfig, TtsConfig, TtsService, VoiceService};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

pub const LIVEKIT_KEY: &str = "devkey";
pub const LIVEKIT_SECRET: &str = "secret";

/// Starts a provider stand-in that always answers `status` with `payload`.
pub async fn start_provider(status: StatusCode, payload: Vec<u8>) -> String {
    let app = Router::new().route(
        "/v1/speech/stream",
        post(move || {
            let payload = payload.clone();
            async move { (status, payload) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let addr = listener.local_addr().expect("mock provider addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock provider");
    });
    format!("http://{}/v1/speech/stream", addr)
}

/// 24 kHz mono 16-bit WAV of `frames` samples.
pub fn wav_bytes(frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for i in 0..frames {
            writer
                .write_sample(((i % 100) as i16 - 50) * 100)
                .expect("wav sample");
        }
        writer.finalize().expect("wav finalize");
    }
    cursor.into_inner()
}

pub fn livekit_config() -> LiveKitConfig {
    // Nothing listens on port 9, so room service calls fail fast.
    let mut config = LiveKitConfig::new("http://127.0.0.1:9", LIVEKIT_KEY, LIVEKIT_SECRET);
    config.public_url = "wss://voice.example.com".to_string();
    config
}

/// Starts a LiveKit room service stand-in whose `ListParticipants` always
/// answers `status` with `body`. Returns a config pointing at it.
pub async fn start_livekit(status: StatusCode, body: &'static str) -> LiveKitConfig {
    let app = Router::new().route(
        "/twirp/livekit.RoomService/ListParticipants",
        post(move || async move { (status, body) }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock livekit");
    let addr = listener.local_addr().expect("mock livekit addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock livekit");
    });

    let mut config = livekit_config();
    config.url = format!("http://{}", addr);
    config
}

pub fn tts_service(provider_url: &str) -> TtsService {
    let mut config = TtsConfig::new(provider_url, "test-api-key");
    config.format = AudioEncoding::Wav;
    config.failure_backoff_ms = 10;
    TtsService::new(&config).expect("tts service")
}

pub fn state_with(livekit: LiveKitConfig, tts: Option<TtsService>) -> Arc<AppState> {
    Arc::new(AppState::new(VoiceService::new(livekit), tts, "en-US-zion"))
}

/// Sends one request through a fresh router and returns status plus JSON body.
pub async fn send(
    state: &Arc<AppState>,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = neo_server::app(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
