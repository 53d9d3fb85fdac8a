//! Toolpilot - a minimal tool-calling agent
//!
//! Connects to any OpenAI-compatible chat completion endpoint and lets the
//! model answer questions by calling local tools (a calculator and a weather
//! lookup) in a bounded loop.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Completion gateway abstraction with an OpenAI-compatible client
//! - **Tools**: Tool trait, registry, and the built-in tools
//! - **Agent**: The tool-calling loop and conversation history
//! - **CLI**: Interactive REPL and connectivity check
//!
//! # Usage
//!
//! ```rust,no_run
//! use toolpilot::{Agent, Config};
//!
//! #[tokio::main]
//! async fn main() -> toolpilot::Result<()> {
//!     let config = Config::load(None)?;
//!     let mut agent = Agent::from_config(&config)?;
//!
//!     let answer = agent.handle_turn("What is 123 + 456?").await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, BUDGET_EXHAUSTED_MESSAGE};
pub use cli::Repl;
pub use core::{Config, Result, ToolpilotError};
pub use llm::{CompletionGateway, OpenAiClient, Reply};
pub use tools::{Tool, ToolRegistry};
