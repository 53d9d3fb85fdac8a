//! Configuration management for toolpilot
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Lookup order for the config file: an explicit path, then `./config.toml`,
//! `./config.json`, and finally `~/.config/toolpilot/config.toml`.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{Result, ToolpilotError};

/// Main configuration for toolpilot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Agent loop configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of an OpenAI-compatible API, e.g. http://localhost:8000/v1
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    #[serde(alias = "timeout")]
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum Ask iterations per turn
    /// Default: 10
    pub max_iterations: usize,
    /// System prompt override
    pub system_prompt: Option<String>,
    /// Number of recent messages sent upstream; unset sends the full history
    pub context_window: Option<usize>,
    /// Whether to show debug output
    pub debug: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("TOOLPILOT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
            api_key: env::var("TOOLPILOT_API_KEY").unwrap_or_default(),
            model: env::var("TOOLPILOT_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string()),
            timeout_secs: env_parse("TOOLPILOT_TIMEOUT_SECS").unwrap_or(30),
            temperature: 0.7,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: env_parse("TOOLPILOT_MAX_ITERATIONS").unwrap_or(10),
            system_prompt: None,
            context_window: None,
            debug: env::var("TOOLPILOT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolpilot")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Files probed when no explicit path is given, in priority order
    fn candidate_files() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config.toml"),
            PathBuf::from("config.json"),
            Self::config_file(),
        ]
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    ///
    /// An explicit path must exist. Without one, the first candidate file
    /// found is used, falling back to defaults when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::candidate_files().into_iter().find(|p| p.exists()) {
                Some(path) => Self::load_from_path(&path)?,
                None => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file.
    ///
    /// `.json` files are read as JSON, everything else as TOML. Fields missing
    /// from the file take their default values.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolpilotError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ToolpilotError::config(format!("Failed to read config: {}", e)))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: Config = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| ToolpilotError::config(format!("Failed to parse config: {}", e)))?
        } else {
            toml::from_str(&content)
                .map_err(|e| ToolpilotError::config(format!("Failed to parse config: {}", e)))?
        };

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Check value ranges and the base URL
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ToolpilotError::config(format!("Invalid base_url '{}': {}", self.api.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ToolpilotError::config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ToolpilotError::config("timeout_secs must be at least 1"));
        }

        if !(0.0..=2.0).contains(&self.api.temperature) {
            return Err(ToolpilotError::config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.api.temperature
            )));
        }

        if self.agent.max_iterations == 0 {
            return Err(ToolpilotError::config("max_iterations must be at least 1"));
        }

        if self.agent.context_window == Some(0) {
            return Err(ToolpilotError::config("context_window must be at least 1"));
        }

        Ok(())
    }

    /// Save configuration to the user config file and return its path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| ToolpilotError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ToolpilotError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| ToolpilotError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The chat completions endpoint
    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// API key safe for display: the first 10 characters followed by `...`
    pub fn masked_key(&self) -> String {
        if self.api_key.chars().count() > 10 {
            let prefix: String = self.api_key.chars().take(10).collect();
            format!("{}...", prefix)
        } else {
            self.api_key.clone()
        }
    }
}
