//! Tools module - capabilities the model can invoke
//!
//! Contains the `Tool` trait, the registry, and the built-in calculator and
//! weather tools.

pub mod calculator;
pub mod registry;
pub mod tool;
pub mod validation;
pub mod weather;

pub use calculator::CalculatorTool;
pub use registry::ToolRegistry;
pub use tool::Tool;
pub use weather::WeatherTool;
