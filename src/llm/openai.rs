//! OpenAI-compatible chat completions client
//!
//! Async HTTP client for `POST {base_url}/chat/completions` with tool calling.
//! Works with any server speaking the same wire format (DeepSeek, Qwen,
//! vLLM, llama.cpp server, ...).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::core::{ApiConfig, Message, Result, Role, ToolCall, ToolDefinition, ToolpilotError};
use crate::llm::traits::{CompletionGateway, Reply, TokenUsage};

const LOG_PREVIEW_CHARS: usize = 500;

/// OpenAI-compatible API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    temperature: f32,
}

/// Message as sent on the wire
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    arguments: &'a str,
}

impl OpenAiClient {
    /// Create a client from the API section of the configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolpilotError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.chat_endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
        })
    }

    /// The full chat completions URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert an internal Message to the wire format
    fn to_wire_message(msg: &Message) -> WireMessage<'_> {
        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| WireToolCall {
                    id: &tc.id,
                    call_type: "function",
                    function: WireFunction {
                        name: &tc.name,
                        arguments: &tc.arguments,
                    },
                })
                .collect::<Vec<_>>()
        });

        // Tool-only assistant turns go out with a null content field
        let content = if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.as_str())
        };

        WireMessage {
            role: msg.role,
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.as_deref(),
        }
    }

    /// Map a reqwest failure onto the gateway error taxonomy
    fn classify(&self, err: reqwest::Error) -> ToolpilotError {
        if err.is_timeout() {
            ToolpilotError::Timeout(self.timeout)
        } else if err.is_connect() {
            ToolpilotError::transport(format!("Cannot connect to {}: {}", self.endpoint, err))
        } else {
            ToolpilotError::transport(err.to_string())
        }
    }
}

/// Build a Reply from the first choice of a response body.
///
/// Missing or null fields fall back to their empty form; providers differ
/// slightly in what they include.
pub(crate) fn parse_reply(body: &Value) -> Reply {
    let message = &body["choices"][0]["message"];

    let content = message["content"].as_str().unwrap_or_default().to_string();

    let tool_calls = message["tool_calls"]
        .as_array()
        .map(|calls| calls.iter().map(parse_tool_call).collect())
        .unwrap_or_default();

    let usage = body.get("usage").filter(|u| u.is_object()).map(|u| {
        // Counts beyond u32 saturate instead of wrapping
        let count = |key: &str| {
            u[key]
                .as_u64()
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        };
        let prompt_tokens = count("prompt_tokens").unwrap_or(0);
        let completion_tokens = count("completion_tokens").unwrap_or(0);
        let total_tokens = count("total_tokens")
            .unwrap_or_else(|| prompt_tokens.saturating_add(completion_tokens));
        TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    });

    Reply {
        content,
        tool_calls,
        usage,
        model: body["model"].as_str().map(str::to_string),
    }
}

fn parse_tool_call(raw: &Value) -> ToolCall {
    let id = raw["id"].as_str().unwrap_or_default();
    let name = raw["function"]["name"].as_str().unwrap_or_default();
    let arguments = match &raw["function"]["arguments"] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        // Some servers send the arguments object unencoded
        other => other.to_string(),
    };
    ToolCall::new(id, name, arguments)
}

/// Shorten text for log output without splitting a character
fn preview(text: &str) -> String {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl CompletionGateway for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Reply> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            tools: tools.filter(|t| !t.is_empty()),
            temperature: self.temperature,
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let request_json = serde_json::to_string(&request)?;
            tracing::debug!(endpoint = %self.endpoint, body = %preview(&request_json), "sending completion request");
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| self.classify(e))?;
        tracing::debug!(status = status.as_u16(), body = %preview(&response_text), "received completion response");

        if !status.is_success() {
            return Err(ToolpilotError::upstream(status.as_u16(), response_text));
        }

        let body: Value = serde_json::from_str(&response_text).map_err(|e| {
            ToolpilotError::InvalidResponse(format!("response body is not JSON: {}", e))
        })?;

        Ok(parse_reply(&body))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let mut config = ApiConfig::default();
        config.base_url = "http://localhost:8000/v1/".to_string();
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_message_conversion() {
        let msg = Message::user("Hello");
        let wire = serde_json::to_value(OpenAiClient::to_wire_message(&msg)).unwrap();
        assert_eq!(wire, json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_tool_only_assistant_sends_null_content() {
        let msg = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "calculator", r#"{"expression":"1+1"}"#)],
        );
        let wire = serde_json::to_value(OpenAiClient::to_wire_message(&msg)).unwrap();
        assert_eq!(
            wire,
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "calculator", "arguments": "{\"expression\":\"1+1\"}"}
                }]
            })
        );
    }

    #[test]
    fn test_tool_result_carries_call_id() {
        let msg = Message::tool_result("call_1", "2");
        let wire = serde_json::to_value(OpenAiClient::to_wire_message(&msg)).unwrap();
        assert_eq!(wire["tool_call_id"], "call_1");
        assert_eq!(wire["role"], "tool");
    }

    #[test]
    fn test_parse_reply_defaults_missing_fields() {
        assert_eq!(parse_reply(&json!({})), Reply::default());
        assert_eq!(parse_reply(&json!({"choices": []})), Reply::default());

        let reply = parse_reply(&json!({"choices": [{"message": {"content": null}}]}));
        assert_eq!(reply.content, "");
        assert!(reply.tool_calls.is_empty());

        let reply = parse_reply(&json!({
            "choices": [{"message": {"content": "hi"}}],
            "usage": {"prompt_tokens": 4294967295u64, "completion_tokens": 1}
        }));
        assert_eq!(reply.content, "hi");
        assert_eq!(reply.usage.unwrap().total_tokens, u32::MAX);

        let reply = parse_reply(&json!({
            "choices": [{"message": {"content": "hi"}}],
            "usage": {"prompt_tokens": 5000000000u64, "completion_tokens": 2, "total_tokens": 5000000002u64}
        }));
        let usage = reply.usage.unwrap();
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.total_tokens, u32::MAX);
    }

    #[test]
    fn test_parse_reply_tool_calls() {
        let reply = parse_reply(&json!({
            "model": "deepseek-chat",
            "choices": [{"message": {
                "content": "",
                "tool_calls": [
                    {"id": "a", "function": {"name": "calculator", "arguments": "{\"expression\":\"2*3\"}"}},
                    {"function": {"name": "get_weather", "arguments": {"city": "Tokyo"}}}
                ]
            }}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }));

        assert_eq!(reply.tool_calls.len(), 2);
        assert_eq!(reply.tool_calls[0].id, "a");
        assert_eq!(reply.tool_calls[0].arguments, "{\"expression\":\"2*3\"}");
        assert_eq!(reply.tool_calls[1].id, "");
        assert_eq!(reply.tool_calls[1].arguments, "{\"city\":\"Tokyo\"}");
        assert_eq!(reply.model.as_deref(), Some("deepseek-chat"));
        assert_eq!(reply.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let long = "天".repeat(LOG_PREVIEW_CHARS + 3);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), LOG_PREVIEW_CHARS + 3);
    }
}
