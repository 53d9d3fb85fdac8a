//! Connectivity smoke test
//!
//! Sends a single request without a tool catalog and reports the outcome
//! with hints for the usual failure modes.

use crate::core::{Config, Message, Result, ToolpilotError};
use crate::llm::{CompletionGateway, OpenAiClient, Reply};

/// Message sent by the smoke test
pub const CHECK_PROMPT: &str = "Hello, please reply with 'connection successful'";

/// Send the smoke-test message through a gateway
pub async fn check_connection(gateway: &dyn CompletionGateway) -> Result<Reply> {
    gateway.complete(&[Message::user(CHECK_PROMPT)], None).await
}

/// Suggestions for resolving a failed request
pub fn hints(err: &ToolpilotError) -> &'static [&'static str] {
    match err {
        ToolpilotError::Transport(_) => &[
            "Make sure the model API server is running",
            "Check that base_url is correct",
            "Check that the port is not used by another process",
        ],
        ToolpilotError::Timeout(_) => &[
            "The server took too long to respond",
            "Raise api.timeout_secs or try a smaller model",
        ],
        ToolpilotError::Upstream { status: 401 | 403, .. } => {
            &["The server rejected the API key; check api.api_key"]
        }
        ToolpilotError::Upstream { status: 404, .. } => {
            &["Check base_url and that the model name exists on the server"]
        }
        ToolpilotError::Upstream { .. } => &["The server returned an error; see the body above"],
        _ => &[],
    }
}

/// Run the smoke test against the configured endpoint, printing the result.
///
/// Returns whether the request succeeded.
pub async fn run_check(config: &Config) -> bool {
    println!("{}", "=".repeat(50));
    println!("Testing API connection");
    println!("{}", "=".repeat(50));
    println!();
    println!("Endpoint: {}", config.api.chat_endpoint());
    println!("Model:    {}", config.api.model);
    println!("API key:  {}", config.api.masked_key());
    println!();
    println!("Sending test request...");

    let outcome = match OpenAiClient::from_config(&config.api) {
        Ok(client) => check_connection(&client).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(reply) => {
            println!("Connection successful!");
            println!("Model reply: {}", reply.content);
            println!();
            println!("All good. Run `toolpilot` to start the agent.");
            true
        }
        Err(e) => {
            println!("Connection failed: {}", e);
            for hint in hints(&e) {
                println!("  - {}", hint);
            }
            println!();
            println!("Check the configuration and the API server, then try again.");
            false
        }
    }
}
