//! Completion gateway trait
//!
//! Abstracts the single request/response exchange with a chat completion
//! endpoint so the agent loop can run against any backend, including
//! scripted ones in tests.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolCall, ToolDefinition};

/// One completion reply: optional text plus zero or more tool requests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    /// Text content of the reply, possibly empty
    pub content: String,
    /// Tool calls the model wants to make, in emission order
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the reply, when reported
    pub model: Option<String>,
}

impl Reply {
    /// A plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A reply requesting tools
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
            ..Default::default()
        }
    }

    /// Whether the model asked for any tools
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Stateless adapter turning a conversation into one structured reply
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Issue exactly one completion request.
    ///
    /// `messages` must be non-empty. `tools`, when given, is offered to the
    /// model as its callable catalog.
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Reply>;

    /// Get the gateway name
    fn name(&self) -> &str;
}
