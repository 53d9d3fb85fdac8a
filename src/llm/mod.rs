//! LLM module - completion endpoint integration
//!
//! Provides the gateway abstraction with an OpenAI-compatible implementation.

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::{CompletionGateway, Reply, TokenUsage};
