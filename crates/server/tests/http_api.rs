//! Router tests against the HTTP surface with stub model, search and TTS

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sonocare_agent::ChatService;
use sonocare_config::Settings;
use sonocare_core::llm_types::{GenerateResponse, Message, Role, ToolDefinition};
use sonocare_core::SpeechAudio;
use sonocare_llm::{LlmBackend, LlmError};
use sonocare_pipeline::SpeechSynthesizer;
use sonocare_server::{create_router, AppState};
use sonocare_tools::{create_registry, SearchError, SearchProvider, SearchResult};

/// Answers with the last user message, and counts prior history turns
///
/// `fail` errors at once, `slow` errors after a delay, `crash` panics.
struct EchoBackend;

#[async_trait]
impl LlmBackend for EchoBackend {
    async fn generate(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<GenerateResponse, LlmError> {
        let users: Vec<&Message> = messages.iter().filter(|m| m.role == Role::User).collect();
        let last = users.last().map(|m| m.content.as_str()).unwrap_or_default();
        match last {
            "fail" => return Err(LlmError::Timeout),
            "slow" => {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                return Err(LlmError::Timeout);
            }
            "crash" => panic!("backend crashed"),
            _ => {}
        }
        Ok(GenerateResponse::text(format!(
            "You said: {} ({} earlier)",
            last,
            users.len() - 1
        )))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

struct NoSearch;

#[async_trait]
impl SearchProvider for NoSearch {
    async fn search(&self, _: &str, _: usize) -> Result<Vec<SearchResult>, SearchError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "none"
    }
}

struct Beep;

#[async_trait]
impl SpeechSynthesizer for Beep {
    async fn synthesize(&self, _text: &str) -> Option<SpeechAudio> {
        Some(SpeechAudio::new(vec![1, 2, 3, 4], 24_000, "audio/L16;rate=24000"))
    }
}

fn app(with_tts: bool) -> Router {
    let settings = Settings::default();
    let tools = Arc::new(create_registry(&settings, Arc::new(NoSearch)));
    let mut chat = ChatService::from_settings(&settings, Arc::new(EchoBackend), tools);
    if with_tts {
        chat = chat.with_tts(Arc::new(Beep));
    }
    create_router(AppState::new(settings, chat))
}

async fn post_chat(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let response = app(false)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_index_page() {
    let response = app(false)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("SonoCare"));
    assert!(page.contains("/chat"));
}

#[tokio::test]
async fn test_missing_message_is_400() {
    let (status, body) = post_chat(app(false), "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No message provided"}));

    let (status, _) = post_chat(app(false), r#"{"message": ""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreadable_body_is_500() {
    let (status, body) = post_chat(app(false), "not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chat_reply() {
    let (status, body) = post_chat(app(false), r#"{"message": "hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"response": "You said: hello (0 earlier)", "audio_available": false})
    );
}

#[tokio::test]
async fn test_chat_history_is_forwarded() {
    let request = json!({
        "message": "and kidneys?",
        "history": [
            {"role": "user", "content": "abdomen prep?"},
            {"role": "assistant", "content": "Fast for 6-8 hours."}
        ]
    });
    let (status, body) = post_chat(app(false), &request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "You said: and kidneys? (1 earlier)");
}

#[tokio::test]
async fn test_model_failure_is_200_with_error_text() {
    let (status, body) = post_chat(app(false), r#"{"message": "fail"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "An error occurred: LLM error: Timeout");
}

#[tokio::test]
async fn test_slow_turn_still_answers_with_error_text() {
    let (status, body) = post_chat(app(false), r#"{"message": "slow"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"response": "An error occurred: LLM error: Timeout", "audio_available": false})
    );
}

#[tokio::test]
async fn test_failed_turn_task_is_500_with_json_error() {
    let (status, body) = post_chat(app(false), r#"{"message": "crash"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Chat task failed"));
}

#[tokio::test]
async fn test_voice_reply_carries_audio() {
    let (status, body) = post_chat(app(true), r#"{"message": "hi", "voice": true}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["audio_available"], true);
    assert_eq!(body["audio"], "AQIDBA==");
    assert_eq!(body["sample_rate"], 24000);

    // no audio unless asked for
    let (_, body) = post_chat(app(true), r#"{"message": "hi"}"#).await;
    assert_eq!(body["audio_available"], false);
    assert!(body.get("audio").is_none());
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = app(false)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
