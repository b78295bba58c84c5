//! neo-nomad server binary.
//!
//! Starts an axum HTTP server with structured logging, issues LiveKit join
//! tokens, hosts the agent's voice sessions, and shuts down gracefully on
//! SIGTERM/SIGINT.

use neo_server::{app, config, AppState};
use neo_voice::{TtsService, VoiceService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("NEO_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration: the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let voice_service = VoiceService::new(config.livekit.clone());
    if voice_service.is_enabled() {
        tracing::info!(url = voice_service.get_url(), "LiveKit configured");
    } else {
        tracing::warn!("LiveKit URL not configured, token issuance disabled");
    }

    let tts_service = match TtsService::new(&config.tts) {
        Ok(tts) => {
            tracing::info!(
                model = ?config.tts.model,
                format = ?config.tts.format,
                decode_workers = config.tts.decode_workers,
                "speech synthesis configured"
            );
            Some(tts)
        }
        Err(e) => {
            tracing::warn!("speech synthesis disabled: {}", e);
            None
        }
    };

    let state = Arc::new(AppState::new(
        voice_service,
        tts_service,
        config.tts.default_voice_id.clone(),
    ));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    tracing::info!(%addr, "starting neo-nomad server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address: is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    state.close_all_sessions();
    tracing::info!("neo-nomad server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
