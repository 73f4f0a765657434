use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{builtin_tools, Tool};
use crate::errors::RegistryError;

lazy_static! {
    static ref TOOL_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    static ref GLOBAL_REGISTRY: Result<Arc<ToolRegistry>, RegistryError> =
        ToolRegistry::discover().map(Arc::new);
}

/// Function-calling descriptor advertised to backends for one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    #[serde(default)]
    pub strict: bool,
}

impl ToolSchema {
    /// Every tool takes a single string `input`; structured tools ask for JSON in it
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "input": {
                            "type": "string",
                            "description": "Input for the tool"
                        }
                    },
                    "required": ["input"],
                    "additionalProperties": false
                }),
                strict: true,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Catalog of tools addressable by name.
///
/// Populated once, then only read. Registration order is kept for listings
/// and schemas.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every built-in tool
    pub fn discover() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for tool in builtin_tools() {
            registry.register(tool)?;
        }
        debug!(tools = registry.len(), "discovered tools");
        Ok(registry)
    }

    /// The process-wide registry, discovered on first access
    pub fn global() -> Result<Arc<ToolRegistry>, RegistryError> {
        GLOBAL_REGISTRY.clone()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if !TOOL_NAME.is_match(&name) {
            return Err(RegistryError::InvalidToolName(name));
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateToolName(name));
        }

        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn fetch(&self, name: &str) -> Result<&dyn Tool, RegistryError> {
        self.index
            .get(name)
            .map(|&i| self.tools[i].as_ref())
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|tool| ToolSchema::new(tool.name(), tool.description()))
            .collect()
    }

    pub fn tools(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echoes its input"
        }

        async fn call(&self, input: &str) -> String {
            input.to_string()
        }
    }

    #[test]
    fn test_register_and_fetch() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();

        assert_eq!(registry.fetch("echo").unwrap().name(), "echo");
        assert_eq!(
            registry.fetch("missing").err(),
            Some(RegistryError::UnknownTool("missing".to_string()))
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();
        let result = registry.register(Box::new(EchoTool("echo")));

        assert_eq!(
            result,
            Err(RegistryError::DuplicateToolName("echo".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut registry = ToolRegistry::new();
        let result = registry.register(Box::new(EchoTool("bad name!")));
        assert!(matches!(result, Err(RegistryError::InvalidToolName(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_schema_round_trip_preserves_name() -> anyhow::Result<()> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("first")))?;
        registry.register(Box::new(EchoTool("second-tool")))?;

        for (schema, name) in registry.schemas().iter().zip(registry.names()) {
            let encoded = serde_json::to_string(schema)?;
            let decoded: ToolSchema = serde_json::from_str(&encoded)?;
            assert_eq!(decoded.name(), name);
        }
        Ok(())
    }

    #[test]
    fn test_schema_shape() {
        let schema = serde_json::to_value(ToolSchema::new("calculate", "Math")).unwrap();
        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "calculate");
        assert_eq!(schema["function"]["strict"], true);
        assert_eq!(
            schema["function"]["parameters"]["required"],
            json!(["input"])
        );
        assert_eq!(
            schema["function"]["parameters"]["properties"]["input"]["type"],
            "string"
        );
    }

    #[test]
    fn test_global_registry_holds_builtins() {
        let registry = ToolRegistry::global().unwrap();
        let again = ToolRegistry::global().unwrap();

        assert!(Arc::ptr_eq(&registry, &again));
        assert_eq!(registry.len(), builtin_tools().len());
        assert!(registry.fetch("calculate").is_ok());
    }
}
