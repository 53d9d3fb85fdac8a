//! Interactive REPL for toolpilot
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::Agent;
use crate::cli::check::hints;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
    config: Config,
}

impl Repl {
    /// Create a REPL around an existing agent
    pub fn new(agent: Agent, config: Config) -> Self {
        Self { agent, config }
    }

    /// Create a REPL with an agent built from configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let agent = Agent::from_config(&config)?;
        Ok(Self::new(agent, config))
    }

    /// Run the REPL until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            match handle_command(&input, &mut self.agent, &self.config) {
                CommandResult::Exit => {
                    println!("\nGoodbye!");
                    break;
                }
                CommandResult::Clear => {
                    println!("Conversation cleared.\n");
                }
                CommandResult::Handled(output) => {
                    println!("{}\n", output);
                }
                CommandResult::None => {}
                CommandResult::Continue(input) => match self.agent.handle_turn(&input).await {
                    Ok(response) => {
                        println!("\nAgent: {}\n", response);
                    }
                    Err(e) => {
                        let hint = hints(&e).first().map(|h| format!(" ({})", h));
                        eprintln!("\nError: {}{}\n", e, hint.unwrap_or_default());
                    }
                },
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        println!("{}", "=".repeat(50));
        println!("Toolpilot - tool-calling agent");
        println!("{}", "=".repeat(50));
        println!();
        println!("Endpoint: {}", self.config.api.chat_endpoint());
        println!("Model:    {}", self.config.api.model);
        println!("Tools:    {}", self.agent.tools().names().join(", "));
        println!();
        println!("Commands: help, clear, status, tools, exit");
        println!("{}", "-".repeat(50));
    }
}
