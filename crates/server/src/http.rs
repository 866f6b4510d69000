//! HTTP Endpoints
//!
//! `GET /` chat page, `POST /chat`, `GET /health`, `GET /metrics`.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use sonocare_core::ChatHistory;

use crate::metrics::{metrics_handler, record_chat_request, record_turn_latency};
use crate::state::AppState;
use crate::ServerError;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Create the application router
///
/// No request timeout is applied: a slow turn is bounded by the model
/// client's own timeout and retries, and its failure is reported in the
/// reply text.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);

    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// Disabled CORS sends no CORS headers (same-origin page only). Enabled with
/// no origins allows any origin.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::new();
    }

    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Chat request
///
/// `message` is optional here so that a missing message is a 400 rather than
/// a parse failure.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
    #[serde(default)]
    history: ChatHistory,
    #[serde(default)]
    voice: bool,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    audio_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
}

/// Chat endpoint
///
/// The body is parsed by hand so an unreadable body is reported as
/// `{"error": ...}` with status 500 instead of axum's plain-text rejection.
async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>, ServerError> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable chat request");
        ServerError::Internal(e.to_string())
    })?;

    let message = match request.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => return Err(ServerError::InvalidRequest("No message provided".to_string())),
    };
    let voice = request.voice;
    let history = request.history;

    record_chat_request(voice);
    tracing::info!(chars = message.len(), history = history.len(), voice, "Chat request");

    let start = Instant::now();
    let chat = state.chat.clone();
    let reply = tokio::spawn(async move { chat.respond_with_audio(&message, &history, voice).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Chat task failed");
            ServerError::Internal(format!("Chat task failed: {}", e))
        })?;
    record_turn_latency(start.elapsed());

    let (audio, sample_rate) = match reply.audio {
        Some(audio) => (
            Some(base64::engine::general_purpose::STANDARD.encode(&audio.data)),
            Some(audio.sample_rate),
        ),
        None => (None, None),
    };

    Ok(Json(ChatResponse {
        response: reply.text,
        audio_available: audio.is_some(),
        audio,
        sample_rate,
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
