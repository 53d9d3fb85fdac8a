//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.
//! Registration order is the catalog order offered to the model.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::core::{Result, ToolDefinition, ToolResult, ToolpilotError};
use crate::tools::calculator::CalculatorTool;
use crate::tools::tool::Tool;
use crate::tools::validation::{check_schema, validate_arguments};
use crate::tools::weather::WeatherTool;

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    /// Tools in registration order
    tools: Vec<Arc<dyn Tool>>,
    /// Catalog entries, parallel to `tools`
    definitions: Vec<ToolDefinition>,
    /// Position of each tool by name
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in tools
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(CalculatorTool::new())?;
        registry.register(WeatherTool::new())?;
        Ok(registry)
    }

    /// Register a tool.
    ///
    /// Fails on a duplicate name or a parameter schema that does not
    /// describe an object.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let definition = tool.definition();
        let name = definition.function.name.clone();

        if name.is_empty() {
            return Err(ToolpilotError::registration("tool name must not be empty"));
        }
        if self.index.contains_key(&name) {
            return Err(ToolpilotError::registration(format!(
                "duplicate tool name: {}",
                name
            )));
        }
        check_schema(&definition.function.parameters)
            .map_err(|e| ToolpilotError::registration(format!("{}: {}", name, e)))?;

        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        self.definitions.push(definition);
        Ok(())
    }

    /// Get all tool definitions in registration order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .map(|d| d.function.name.as_str())
            .collect()
    }

    /// Check if a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    ///
    /// Never fails: an unknown name, invalid arguments, a tool error, or a
    /// panic inside the tool all come back as a failed `ToolResult` whose
    /// output explains what went wrong.
    pub async fn execute(&self, name: &str, args: &Value) -> ToolResult {
        let Some(&idx) = self.index.get(name) else {
            tracing::warn!(tool = name, "model requested an unknown tool");
            return ToolResult::failure(name, format!("Unknown tool: {}", name));
        };

        let tool = &self.tools[idx];
        let schema = &self.definitions[idx].function.parameters;

        if let Err(reason) = validate_arguments(args, schema) {
            return ToolResult::failure(name, ToolpilotError::tool(reason).to_string());
        }

        match AssertUnwindSafe(tool.invoke(args)).catch_unwind().await {
            Ok(Ok(output)) => ToolResult::success(name, output),
            Ok(Err(err @ ToolpilotError::ToolExecution(_))) => {
                ToolResult::failure(name, err.to_string())
            }
            Ok(Err(err)) => ToolResult::failure(name, ToolpilotError::tool(err.to_string()).to_string()),
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(tool = name, %detail, "tool panicked");
                ToolResult::failure(
                    name,
                    ToolpilotError::tool(format!("tool panicked: {}", detail)).to_string(),
                )
            }
        }
    }
}
