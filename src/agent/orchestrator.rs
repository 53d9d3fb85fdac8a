//! Agent orchestrator
//!
//! Drives the tool-calling loop: ask the model, run whatever tools it
//! requested, feed the results back, and repeat until it answers without
//! tools or the iteration budget runs out.

use std::sync::Arc;

use serde_json::Value;

use crate::agent::conversation::{ContextPolicy, Conversation};
use crate::agent::loop_state::{IterationBudget, TurnOutcome};
use crate::core::{AgentConfig, Config, Message, Result, ToolCall, ToolResult};
use crate::llm::{CompletionGateway, OpenAiClient, Reply};
use crate::tools::ToolRegistry;

/// System prompt used when none is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. You can use tools to help the user solve problems.
When a tool is needed, call the corresponding tool function.
If the tool results are already enough to answer the question, answer directly.";

/// Returned when a turn passes its iteration cap
pub const BUDGET_EXHAUSTED_MESSAGE: &str =
    "Reached the maximum number of iterations. Please simplify your question.";

/// Default cap on Ask iterations per turn
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Main agent that orchestrates the model and tools
///
/// Each instance owns its history exclusively; serve concurrent
/// conversations with one agent each.
pub struct Agent {
    /// Completion backend
    gateway: Arc<dyn CompletionGateway>,
    /// Tool registry, shared read-only
    tools: Arc<ToolRegistry>,
    /// Conversation history
    conversation: Conversation,
    /// System prompt prepended to every request
    system_prompt: String,
    /// Ask iterations allowed per turn
    max_iterations: usize,
}

impl Agent {
    /// Create an agent with default settings
    pub fn new(gateway: Arc<dyn CompletionGateway>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            gateway,
            tools,
            conversation: Conversation::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Create an agent with the agent section of the configuration applied
    pub fn with_settings(
        gateway: Arc<dyn CompletionGateway>,
        tools: Arc<ToolRegistry>,
        settings: &AgentConfig,
    ) -> Self {
        let mut agent = Self::new(gateway, tools).with_max_iterations(settings.max_iterations);
        agent.conversation = Conversation::with_window(settings.context_window);
        if let Some(ref prompt) = settings.system_prompt {
            agent.system_prompt = prompt.clone();
        }
        agent
    }

    /// Create an agent talking to the configured endpoint with the built-in tools
    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = Arc::new(OpenAiClient::from_config(&config.api)?);
        let tools = Arc::new(ToolRegistry::builtin()?);
        Ok(Self::with_settings(gateway, tools, &config.agent))
    }

    /// Set the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Replace the context policy, starting a new history
    pub fn with_context_policy(mut self, policy: Box<dyn ContextPolicy>) -> Self {
        self.conversation = Conversation::with_policy(policy);
        self
    }

    /// Process one user message and return the final answer.
    ///
    /// Ends when the model replies without tool calls, or with
    /// [`BUDGET_EXHAUSTED_MESSAGE`] once the iteration cap is passed.
    /// Gateway errors propagate; tool failures never do.
    pub async fn handle_turn(&mut self, user_text: &str) -> Result<String> {
        Ok(match self.run_turn(user_text).await? {
            TurnOutcome::Answered(answer) => answer,
            TurnOutcome::BudgetExhausted => BUDGET_EXHAUSTED_MESSAGE.to_string(),
        })
    }

    /// Like [`handle_turn`](Self::handle_turn) but reports how the turn ended
    pub async fn run_turn(&mut self, user_text: &str) -> Result<TurnOutcome> {
        self.conversation.push(Message::user(user_text));

        let tools = Arc::clone(&self.tools);
        let catalog = Some(tools.definitions()).filter(|defs| !defs.is_empty());
        let mut budget = IterationBudget::new(self.max_iterations);

        loop {
            if !budget.advance() {
                tracing::warn!(
                    max_iterations = budget.max_iterations,
                    "iteration budget exhausted"
                );
                return Ok(TurnOutcome::BudgetExhausted);
            }

            tracing::info!(
                iteration = budget.iteration,
                max_iterations = budget.max_iterations,
                "asking model"
            );

            let request = self.conversation.request_messages(&self.system_prompt);
            let Reply {
                content,
                tool_calls,
                usage,
                ..
            } = self.gateway.complete(&request, catalog).await?;

            if let Some(usage) = usage {
                tracing::debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "token usage"
                );
            }

            self.conversation.push(Message::assistant_with_tool_calls(
                content.clone(),
                tool_calls.clone(),
            ));

            if tool_calls.is_empty() {
                tracing::info!(iterations = budget.iteration, "final answer received");
                return Ok(TurnOutcome::Answered(content));
            }

            // Strictly sequential, in emission order
            for call in &tool_calls {
                let result = self.execute_tool_call(call).await;
                self.conversation
                    .push(Message::tool_result(call.id.clone(), result.output));
            }
        }
    }

    /// Parse arguments leniently and dispatch one call to the registry
    async fn execute_tool_call(&self, call: &ToolCall) -> ToolResult {
        let args = call.parsed_arguments().unwrap_or_else(|| {
            if !call.arguments.trim().is_empty() {
                tracing::warn!(
                    tool = %call.name,
                    arguments = %call.arguments,
                    "tool arguments are not a JSON object, using {{}}"
                );
            }
            Value::Object(Default::default())
        });

        tracing::info!(tool = %call.name, id = %call.id, arguments = %args, "calling tool");
        let result = self.tools.execute(&call.name, &args).await;

        if result.success {
            tracing::info!(tool = %call.name, output = %result.output, "tool succeeded");
        } else {
            tracing::warn!(tool = %call.name, output = %result.output, "tool failed");
        }
        result
    }

    /// Start a new session with an empty history
    pub fn reset(&mut self) {
        self.conversation.clear();
    }

    /// The full history, oldest first
    pub fn history(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Get conversation length
    pub fn conversation_length(&self) -> usize {
        self.conversation.len()
    }

    /// Describe how history is windowed upstream
    pub fn context_description(&self) -> String {
        self.conversation.policy_description()
    }

    pub fn iteration_limit(&self) -> usize {
        self.max_iterations
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }
}
