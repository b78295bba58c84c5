#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use neo_voice::TtsConfig;
use serde_json::Value;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as seen by the mock provider.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub payload: Vec<u8>,
    pub delay: Duration,
}

impl MockReply {
    pub fn audio(payload: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            payload,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            payload: body.as_bytes().to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Mutex<MockReply>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process stand-in for the speech provider.
pub struct MockProvider {
    pub url: String,
    state: MockState,
}

impl MockProvider {
    pub async fn start(reply: MockReply) -> Self {
        let state = MockState {
            reply: Arc::new(Mutex::new(reply)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/v1/speech/stream", post(handle_speech))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock provider");
        let addr = listener.local_addr().expect("mock provider addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock provider");
        });

        Self {
            url: format!("http://{}/v1/speech/stream", addr),
            state,
        }
    }

    pub fn set_reply(&self, reply: MockReply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Config pointing at this provider with a short failure backoff.
    pub fn config(&self) -> TtsConfig {
        let mut config = TtsConfig::new(self.url.clone(), "test-api-key");
        config.failure_backoff_ms = 50;
        config
    }
}

async fn handle_speech(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Vec<u8>) {
    let api_key = headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { api_key, body });

    let reply = state.reply.lock().unwrap().clone();
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (reply.status, reply.payload)
}

/// 16-bit PCM WAV with `frames` sample frames of a low-amplitude ramp.
pub fn wav_bytes(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for i in 0..frames {
            let sample = ((i % 200) as i16 - 100) * 50;
            for _ in 0..channels {
                writer.write_sample(sample).expect("wav sample");
            }
        }
        writer.finalize().expect("wav finalize");
    }
    cursor.into_inner()
}

/// MPEG-1 Layer III stream of `frames` silent frames (44.1 kHz mono,
/// 417 bytes and 1152 samples per frame).
pub fn silent_mp3(frames: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(frames * 417);
    for _ in 0..frames {
        out.extend_from_slice(&[0xFF, 0xFB, 0x90, 0xC0]);
        out.resize(out.len() + 413, 0);
    }
    out
}
