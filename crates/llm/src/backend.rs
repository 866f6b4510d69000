//! LLM Backend implementations
//!
//! The chat model is reached through an OpenAI-compatible `chat/completions`
//! endpoint. Gemini exposes one at `.../v1beta/openai`, so the same backend
//! serves Gemini, OpenAI and local servers (vLLM, Ollama).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use sonocare_config::LlmSettings;
use sonocare_core::llm_types::{
    FinishReason, GenerateResponse, Message, Role, TokenUsage, ToolCall, ToolDefinition,
};

use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL (chat completions live at `{endpoint}/chat/completions`)
    pub endpoint: String,
    /// API key
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature (0-2)
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from(&LlmSettings::default())
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key().map(str::to_string),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_seconds),
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

impl LlmConfig {
    /// Config for a local OpenAI-compatible server that needs no key
    pub fn local(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            model: model.into(),
            ..Default::default()
        }
    }

    fn is_local(&self) -> bool {
        self.endpoint.starts_with("http://localhost") || self.endpoint.starts_with("http://127.0.0.1")
    }
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response, offering the model the given tools
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<GenerateResponse, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible backend
///
/// A missing API key is reported per request rather than at construction, so
/// the server can start and answer health checks without credentials.
#[derive(Clone)]
pub struct OpenAIBackend {
    config: LlmConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new backend
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from application settings
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        Self::new(LlmConfig::from(settings))
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref key) = self.config.api_key {
            let auth_value = format!("Bearer {}", key);
            if let Ok(val) = HeaderValue::from_str(&auth_value) {
                headers.insert(reqwest::header::AUTHORIZATION, val);
            }
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools.iter().map(WireTool::from).collect(),
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        }
    }

    /// Execute a single request (used by retry logic)
    async fn execute_request(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Check if an error is retryable
    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<GenerateResponse, LlmError> {
        if self.config.api_key.is_none() && !self.config.is_local() {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let request = self.build_request(messages, tools);
        let start = std::time::Instant::now();

        // Retry loop with exponential backoff
        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&request).await {
                Ok(response) => {
                    tracing::debug!(
                        model = %self.config.model,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "LLM response received"
                    );
                    return response.into_generate_response();
                }
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        // assistant turns that only call tools carry null content
        let content = if msg.role == Role::Assistant && msg.content.is_empty() && !msg.tool_calls.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            role: msg.role.to_string(),
            content,
            tool_calls: msg.tool_calls.iter().map(WireToolCall::from).collect(),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: function_type(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments_value().to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ToolDefinition> for WireTool {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl ChatResponse {
    fn into_generate_response(self) -> Result<GenerateResponse, LlmError> {
        let usage = self
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(index, call)| parse_tool_call(index, call))
            .collect();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some("tool_calls") => FinishReason::ToolCalls,
            _ if !tool_calls.is_empty() => FinishReason::ToolCalls,
            _ => FinishReason::Stop,
        };

        Ok(GenerateResponse {
            text: choice.message.content.unwrap_or_default(),
            finish_reason,
            usage,
            tool_calls,
        })
    }
}

fn parse_tool_call(index: usize, call: WireToolCall) -> ToolCall {
    let arguments: HashMap<String, serde_json::Value> = if call.function.arguments.trim().is_empty() {
        HashMap::new()
    } else {
        serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
            tracing::warn!(
                tool = %call.function.name,
                error = %e,
                "Tool call arguments are not a JSON object, ignoring them"
            );
            HashMap::new()
        })
    };

    // Some compatible servers omit call ids
    let id = if call.id.is_empty() {
        format!("call_{}", index)
    } else {
        call.id
    };

    ToolCall::new(id, call.function.name, arguments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with_key() -> OpenAIBackend {
        let config = LlmConfig {
            api_key: Some("test-key".to_string()),
            ..LlmConfig::local("https://example.com/v1/", "gemini-2.0-flash")
        };
        OpenAIBackend::new(config).unwrap()
    }

    #[test]
    fn test_config_from_settings() {
        let settings = LlmSettings {
            api_key: Some("abc".to_string()),
            max_retries: 5,
            ..LlmSettings::default()
        };
        let config = LlmConfig::from(&settings);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(settings.timeout_seconds));
    }

    #[test]
    fn test_chat_url_trims_slash() {
        assert_eq!(
            backend_with_key().chat_url(),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let headers = backend_with_key().build_headers();
        assert_eq!(
            headers.get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer test-key"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_for_remote_endpoint() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::local("https://example.com/v1", "m")
        };
        let backend = OpenAIBackend::new(config).unwrap();
        let result = backend.generate(&[Message::user("hi")], &[]).await;
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_request_serialization_with_tools() {
        let backend = backend_with_key();
        let tools = vec![ToolDefinition::new(
            "preparation_guide_tool",
            "Preparation guide",
            serde_json::json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        )];
        let request = backend.build_request(&[Message::user("Hello")], &tools);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gemini-2.0-flash");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "preparation_guide_tool");
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let request = backend_with_key().build_request(&[Message::user("Hello")], &[]);
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"tools\""));
    }

    #[test]
    fn test_tool_exchange_messages() {
        let mut args = HashMap::new();
        args.insert("query".to_string(), serde_json::json!("pelvic"));
        let call = ToolCall::new("call_1", "preparation_guide_tool", args);

        let assistant = WireMessage::from(&Message::assistant_tool_calls("", vec![call]));
        let json = serde_json::to_value(&assistant).unwrap();
        assert!(json["content"].is_null());
        assert_eq!(json["tool_calls"][0]["id"], "call_1");
        assert_eq!(json["tool_calls"][0]["type"], "function");
        let args: serde_json::Value =
            serde_json::from_str(json["tool_calls"][0]["function"]["arguments"].as_str().unwrap())
                .unwrap();
        assert_eq!(args["query"], "pelvic");

        let tool = WireMessage::from(&Message::tool("result", "call_1"));
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
    }

    #[test]
    fn test_parse_text_response() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        });
        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        let result = response.into_generate_response().unwrap();

        assert_eq!(result.text, "Hello there");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert!(!result.has_tool_calls());
        assert_eq!(result.usage.unwrap().total_tokens, 13);
    }

    #[test]
    fn test_parse_tool_call_response() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {
                            "id": "",
                            "type": "function",
                            "function": {"name": "search_info_tool", "arguments": "{\"query\":\"3D scan\"}"}
                        },
                        {
                            "id": "abc",
                            "type": "function",
                            "function": {"name": "appointment_booking_tool", "arguments": ""}
                        }
                    ]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        let result = response.into_generate_response().unwrap();

        assert_eq!(result.finish_reason, FinishReason::ToolCalls);
        assert_eq!(result.text, "");
        assert_eq!(result.tool_calls.len(), 2);
        assert_eq!(result.tool_calls[0].id, "call_0");
        assert_eq!(result.tool_calls[0].get_string("query"), Some("3D scan"));
        assert_eq!(result.tool_calls[1].id, "abc");
        assert!(result.tool_calls[1].arguments.is_empty());
    }

    #[test]
    fn test_parse_malformed_arguments_are_dropped() {
        let call = WireToolCall {
            id: "x".to_string(),
            kind: function_type(),
            function: WireFunctionCall {
                name: "outofscope_guardrail_tool".to_string(),
                arguments: "not json".to_string(),
            },
        };
        let parsed = parse_tool_call(0, call);
        assert_eq!(parsed.name, "outofscope_guardrail_tool");
        assert!(parsed.arguments.is_empty());
    }

    #[test]
    fn test_empty_choices_is_invalid() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            response.into_generate_response(),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(OpenAIBackend::is_retryable(&LlmError::Network("x".into())));
        assert!(OpenAIBackend::is_retryable(&LlmError::Timeout));
        assert!(!OpenAIBackend::is_retryable(&LlmError::Api("400".into())));
    }
}
