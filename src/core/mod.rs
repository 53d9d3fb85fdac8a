//! Core module - shared infrastructure for toolpilot
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentConfig, ApiConfig, Config};
pub use error::{Result, ToolpilotError};
pub use types::*;
