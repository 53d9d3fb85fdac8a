//! Conversation history management
//!
//! History is append-only and lives as long as the agent. Which part of it
//! is sent upstream is decided by a [`ContextPolicy`].

use std::fmt;

use crate::core::{Message, Role};

/// Chooses the slice of history sent with each completion request
pub trait ContextPolicy: Send + Sync {
    /// Return a suffix of `history` to send upstream
    fn select<'a>(&self, history: &'a [Message]) -> &'a [Message];

    /// Short description for status output
    fn describe(&self) -> String;
}

/// Send the entire history every time
#[derive(Debug, Clone, Copy, Default)]
pub struct FullHistory;

impl ContextPolicy for FullHistory {
    fn select<'a>(&self, history: &'a [Message]) -> &'a [Message] {
        history
    }

    fn describe(&self) -> String {
        "full history".to_string()
    }
}

/// Send only the most recent messages.
///
/// A window that would open on a `tool` message is widened back to the
/// assistant message that requested it, so tool results always travel with
/// their call. The window may exceed `max_messages` when one reply asks for
/// more tools than fit.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindow {
    pub max_messages: usize,
}

impl SlidingWindow {
    pub fn new(max_messages: usize) -> Self {
        Self { max_messages }
    }
}

impl ContextPolicy for SlidingWindow {
    fn select<'a>(&self, history: &'a [Message]) -> &'a [Message] {
        let mut start = history.len().saturating_sub(self.max_messages);
        while start > 0 && history[start].role == Role::Tool {
            start -= 1;
        }
        &history[start..]
    }

    fn describe(&self) -> String {
        format!("last {} messages", self.max_messages)
    }
}

/// Manages conversation history
pub struct Conversation {
    /// Message history, oldest first
    messages: Vec<Message>,
    /// Selects the upstream view of `messages`
    policy: Box<dyn ContextPolicy>,
}

impl Conversation {
    /// Create a new conversation that sends its full history
    pub fn new() -> Self {
        Self::with_policy(Box::new(FullHistory))
    }

    /// Create a conversation with a custom context policy
    pub fn with_policy(policy: Box<dyn ContextPolicy>) -> Self {
        Self {
            messages: Vec::new(),
            policy,
        }
    }

    /// Create a conversation from an optional window size
    pub fn with_window(window: Option<usize>) -> Self {
        match window {
            Some(max_messages) => Self::with_policy(Box::new(SlidingWindow::new(max_messages))),
            None => Self::new(),
        }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop all messages, keeping the policy
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The full history, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Build the request: a fresh system message followed by the policy's
    /// view of the history
    pub fn request_messages(&self, system_prompt: &str) -> Vec<Message> {
        let window = self.policy.select(&self.messages);
        let mut result = Vec::with_capacity(window.len() + 1);
        result.push(Message::system(system_prompt));
        result.extend(window.iter().cloned());
        result
    }

    pub fn policy_description(&self) -> String {
        self.policy.describe()
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("messages", &self.messages)
            .field("policy", &self.policy.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolCall;

    fn tool_exchange(conv: &mut Conversation, id: &str) {
        conv.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new(id, "calculator", "{}")],
        ));
        conv.push(Message::tool_result(id, "ok"));
    }

    #[test]
    fn test_conversation_basic() {
        let mut conv = Conversation::new();
        conv.push(Message::user("Hello"));
        conv.push(Message::assistant("Hi there!"));

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[1].content, "Hi there!");

        conv.clear();
        assert!(conv.is_empty());
    }

    #[test]
    fn test_system_prompt_is_synthesized_not_stored() {
        let mut conv = Conversation::new();
        conv.push(Message::user("Hello"));

        let messages = conv.request_messages("You are a helpful assistant");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn test_full_history_sends_everything() {
        let mut conv = Conversation::new();
        for i in 0..30 {
            conv.push(Message::user(i.to_string()));
        }
        assert_eq!(conv.request_messages("sys").len(), 31);
    }

    #[test]
    fn test_sliding_window_keeps_recent_messages() {
        let mut conv = Conversation::with_window(Some(3));
        for i in 0..5 {
            conv.push(Message::user(i.to_string()));
        }

        let messages = conv.request_messages("sys");
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "2", "3", "4"]);
        // History itself is never trimmed
        assert_eq!(conv.len(), 5);
    }

    #[test]
    fn test_sliding_window_never_opens_on_tool_result() {
        let mut conv = Conversation::with_window(Some(2));
        conv.push(Message::user("q"));
        tool_exchange(&mut conv, "a");
        tool_exchange(&mut conv, "b");
        conv.push(Message::assistant("answer"));

        // Last two are [tool(b), assistant]; the window reaches back to the call
        let window = SlidingWindow::new(2).select(conv.messages());
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].tool_calls()[0].id, "b");
        assert_eq!(window[2].content, "answer");

        let window = SlidingWindow::new(3).select(conv.messages());
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].role, Role::Assistant);
        assert_eq!(window[1].tool_call_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_sliding_window_smaller_than_one_reply() {
        let mut conv = Conversation::with_window(Some(3));
        conv.push(Message::user("sum three things"));
        conv.push(Message::assistant_with_tool_calls(
            "",
            vec![
                ToolCall::new("a", "calculator", "{}"),
                ToolCall::new("b", "calculator", "{}"),
                ToolCall::new("c", "calculator", "{}"),
            ],
        ));
        for id in ["a", "b", "c"] {
            conv.push(Message::tool_result(id, "ok"));
        }

        let messages = conv.request_messages("sys");
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::Assistant, Role::Tool, Role::Tool, Role::Tool]
        );
        assert_eq!(messages[1].tool_calls().len(), 3);
    }
}
