// Tool trait, registry and schema helpers

use crate::protocol::{CallToolResult, ToolAnnotations, ToolSchema};
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments. `Err` means the arguments were
    /// unusable; broker failures come back as error results.
    async fn execute(&self, arguments: Value) -> Result<CallToolResult>;

    /// What the tool does to remote state
    fn tier(&self) -> ToolTier {
        ToolTier::Read
    }
}

/// Effect of a tool on remote state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolTier {
    /// Read-only operations
    Read,
    /// Creates or updates remote objects
    Write,
    /// Deletes or archives remote objects
    Destructive,
}

impl ToolTier {
    pub fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations {
            read_only_hint: *self == ToolTier::Read,
            destructive_hint: *self == ToolTier::Destructive,
        }
    }
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), tool);
    }

    pub fn register_all(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool schemas, sorted by name, with annotations from each tier
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|tool| {
                let mut schema = tool.schema();
                schema.annotations = Some(tool.tier().annotations());
                schema
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool. Never fails: unknown tools and bad arguments become error
    /// results.
    pub async fn call(&self, name: &str, arguments: Value) -> CallToolResult {
        let Some(tool) = self.get(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return CallToolResult::failure("unknown_tool", format!("Unknown tool: {}", name));
        };

        debug!(tool = %name, "Calling tool");
        match tool.execute(arguments).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %name, error = %e, "Rejected tool arguments");
                CallToolResult::failure("invalid_arguments", format!("{:#}", e))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_enum(values: &[&str], description: &str) -> Value {
    serde_json::json!({
        "type": "string",
        "enum": values,
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_array(items: Value, description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}

pub fn json_schema_free_object(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool {
        name: &'static str,
        tier: ToolTier,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.to_string(),
                description: "Echo the `text` argument".to_string(),
                input_schema: json_schema_object(
                    json!({"text": json_schema_string("Text to echo")}),
                    vec!["text"],
                ),
                annotations: None,
            }
        }

        async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
            let text = arguments
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("missing required argument `text`"))?;
            Ok(CallToolResult::text(text))
        }

        fn tier(&self) -> ToolTier {
            self.tier
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool {
            name: "zz_delete",
            tier: ToolTier::Destructive,
        }));
        registry.register(Arc::new(EchoTool {
            name: "aa_echo",
            tier: ToolTier::Read,
        }));
        registry
    }

    #[test]
    fn test_list_schemas_sorted_with_annotations() {
        let schemas = registry().list_schemas();

        assert_eq!(schemas[0].name, "aa_echo");
        assert_eq!(
            schemas[0].annotations,
            Some(ToolAnnotations {
                read_only_hint: true,
                destructive_hint: false
            })
        );
        assert_eq!(schemas[1].annotations.map(|a| a.destructive_hint), Some(true));
    }

    #[tokio::test]
    async fn test_call_success() {
        let result = registry().call("aa_echo", json!({"text": "hi"})).await;

        assert!(!result.is_error());
        assert_eq!(result.first_text(), Some("hi"));
    }

    #[tokio::test]
    async fn test_call_unknown_tool_is_structured_failure() {
        let result = registry().call("nope", json!({})).await;

        assert!(result.is_error());
        let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(body["kind"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_call_bad_arguments_is_structured_failure() {
        let result = registry().call("aa_echo", json!({})).await;

        assert!(result.is_error());
        let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(body["kind"], "invalid_arguments");
        assert!(body["message"].as_str().unwrap().contains("text"));
    }
}
