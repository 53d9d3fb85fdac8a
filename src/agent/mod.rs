//! Agent module - orchestration and conversation management
//!
//! Contains the tool-calling loop that coordinates completion requests and
//! tool execution.

pub mod conversation;
pub mod loop_state;
pub mod orchestrator;

pub use conversation::{ContextPolicy, Conversation, FullHistory, SlidingWindow};
pub use loop_state::{IterationBudget, TurnOutcome};
pub use orchestrator::{Agent, BUDGET_EXHAUSTED_MESSAGE, DEFAULT_SYSTEM_PROMPT};
