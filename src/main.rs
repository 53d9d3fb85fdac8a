//! Toolpilot - a minimal tool-calling agent
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use toolpilot::cli::run_check;
use toolpilot::{Agent, Config, Repl};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Toolpilot - a minimal tool-calling agent
#[derive(Parser, Debug)]
#[command(name = "toolpilot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,

    /// Model name
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Maximum model calls per question
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Test the API connection and exit
    #[arg(long)]
    check: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Write the effective configuration to the user config file and exit
    #[arg(long)]
    save_config: bool,
}

fn init_logging(debug: bool) {
    let default = if debug { "toolpilot=debug" } else { "toolpilot=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(ref base_url) = args.base_url {
        config.api.base_url = base_url.clone();
    }

    if let Some(ref model) = args.model {
        config.api.model = model.clone();
    }

    if let Some(max_iterations) = args.max_iterations {
        config.agent.max_iterations = max_iterations;
    }

    if args.debug {
        config.agent.debug = true;
    }

    config.validate()?;
    init_logging(config.agent.debug);

    if args.print_config {
        let mut shown = config.clone();
        shown.api.api_key = config.api.masked_key();
        print!("{}", toml::to_string_pretty(&shown)?);
        return Ok(());
    }

    if args.save_config {
        let path = config.save()?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    if args.check {
        if !run_check(&config).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut agent = Agent::from_config(&config)?;
        let response = agent.handle_turn(&prompt).await?;
        println!("{}", response);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}
