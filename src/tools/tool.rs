//! Tool trait implemented by every capability the model can call.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{Result, ToolDefinition, ToolpilotError};

/// A local capability exposed to the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls)
    fn name(&self) -> &str;

    /// Human-readable description shown to the model
    fn description(&self) -> &str;

    /// JSON Schema for the arguments object
    fn parameters(&self) -> Value;

    /// Run the tool. `args` has already been checked against `parameters()`.
    async fn invoke(&self, args: &Value) -> Result<String>;

    /// Catalog entry for this tool
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }
}

/// Get a required string argument
pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolpilotError::tool(format!("missing string argument '{}'", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let args = json!({"city": "Tokyo", "days": 3});
        assert_eq!(required_str(&args, "city").unwrap(), "Tokyo");
        assert!(required_str(&args, "days").is_err());
        assert!(required_str(&args, "missing").is_err());
    }
}
