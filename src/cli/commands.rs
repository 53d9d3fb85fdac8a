//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Agent;
use crate::core::Config;

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
    /// No output needed
    None,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, agent: &mut Agent, config: &Config) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::None;
    }

    match input.to_lowercase().as_str() {
        "exit" | "quit" | "q" | "退出" => CommandResult::Exit,

        "clear" | "reset" => {
            agent.reset();
            CommandResult::Clear
        }

        "help" | "?" => CommandResult::Handled(help_text()),

        "status" => CommandResult::Handled(status_text(agent, config)),

        "tools" => {
            let tools = agent
                .tools()
                .definitions()
                .iter()
                .map(|d| format!("  {:<14} {}", d.function.name, d.function.description))
                .collect::<Vec<_>>();
            if tools.is_empty() {
                CommandResult::Handled("No tools registered.".to_string())
            } else {
                CommandResult::Handled(format!("Available tools:\n{}", tools.join("\n")))
            }
        }

        _ => CommandResult::Continue(input.to_string()),
    }
}

fn status_text(agent: &Agent, config: &Config) -> String {
    format!(
        "Toolpilot Status:\n\
         ─────────────────────────────\n\
         Endpoint:     {}\n\
         Model:        {}\n\
         Gateway:      {}\n\
         Iterations:   {} per turn\n\
         Context:      {}\n\
         History:      {} messages\n\
         Debug:        {}",
        config.api.chat_endpoint(),
        config.api.model,
        agent.gateway_name(),
        agent.iteration_limit(),
        agent.context_description(),
        agent.conversation_length(),
        if config.agent.debug { "on" } else { "off" }
    )
}

/// Generate help text
fn help_text() -> String {
    r#"Toolpilot Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Toolpilot (退出 also works)
  clear, reset     Start a new conversation
  status           Show current configuration
  tools            List the tools the model may call

Keyboard Shortcuts:
  Ctrl+D           Exit Toolpilot

Anything else is sent to the model.
─────────────────────────────────────────────"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Message, Result, ToolDefinition};
    use crate::llm::{CompletionGateway, Reply};
    use crate::tools::ToolRegistry;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct SilentGateway;

    #[async_trait]
    impl CompletionGateway for SilentGateway {
        async fn complete(
            &self,
            _messages: &[Message],
            _tools: Option<&[ToolDefinition]>,
        ) -> Result<Reply> {
            Ok(Reply::text("ok"))
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    fn agent() -> Agent {
        Agent::new(
            Arc::new(SilentGateway),
            Arc::new(ToolRegistry::builtin().unwrap()),
        )
    }

    #[test]
    fn test_exit_aliases() {
        let mut agent = agent();
        let config = Config::default();
        for cmd in ["quit", "exit", "q", "  QUIT  ", "退出"] {
            assert_eq!(handle_command(cmd, &mut agent, &config), CommandResult::Exit);
        }
    }

    #[test]
    fn test_plain_text_passes_through() {
        let mut agent = agent();
        let result = handle_command(" What is 2+2? ", &mut agent, &Config::default());
        assert_eq!(result, CommandResult::Continue("What is 2+2?".to_string()));
    }

    #[test]
    fn test_clear_resets_history() {
        let mut agent = agent();
        tokio_test::block_on(agent.handle_turn("hi")).unwrap();
        assert_eq!(agent.conversation_length(), 2);

        let result = handle_command("clear", &mut agent, &Config::default());
        assert_eq!(result, CommandResult::Clear);
        assert_eq!(agent.conversation_length(), 0);
    }

    #[test]
    fn test_tools_lists_catalog() {
        let mut agent = agent();
        let CommandResult::Handled(output) = handle_command("tools", &mut agent, &Config::default())
        else {
            panic!("expected handled output");
        };
        assert!(output.contains("calculator"));
        assert!(output.contains("get_weather"));
    }

    #[test]
    fn test_status_mentions_model() {
        let mut agent = agent();
        let mut config = Config::default();
        config.api.model = "test-model".to_string();

        let CommandResult::Handled(output) = handle_command("status", &mut agent, &config) else {
            panic!("expected handled output");
        };
        assert!(output.contains("test-model"));
        assert!(output.contains("silent"));
        assert!(output.contains("10 per turn"));
    }
}
