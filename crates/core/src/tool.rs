//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! search the web, evaluate expressions, etc. The model names a tool in its
//! `Action:` line; the dispatcher resolves that name through the
//! [`ToolRegistry`] and calls [`Tool::execute`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ToolError;

/// Arguments passed to a tool, keyed by parameter name.
pub type ToolArguments = serde_json::Map<String, serde_json::Value>;

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name, as the model must spell it in `Action Input:`
    pub name: String,

    /// Informal type name shown in the catalogue (`str`, `int`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// What the parameter means
    pub description: String,

    /// Whether the call fails without it
    #[serde(default)]
    pub required: bool,
}

impl ToolParameter {
    /// A parameter the model must always supply.
    pub fn required(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            required: true,
        }
    }

    /// A parameter the model may omit.
    pub fn optional(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Everything the prompt renderer needs to know about a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Declared parameters, in display order
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

/// The core Tool trait.
///
/// Each tool (calculator, web_search, ...) implements this trait and is
/// registered in the [`ToolRegistry`] when the agent is built.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (shown to the model).
    fn description(&self) -> &str;

    /// Declared parameters, in the order they should be listed.
    fn parameters(&self) -> Vec<ToolParameter>;

    /// Execute the tool with arguments applied by name.
    ///
    /// The returned value is opaque to the loop; the dispatcher stringifies
    /// it into an observation.
    async fn execute(&self, arguments: ToolArguments) -> Result<serde_json::Value, ToolError>;

    /// Describe this tool for catalogue rendering.
    fn describe(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// A registry of available tools.
///
/// Insertion-ordered, so the rendered catalogue and the "available tools"
/// list are stable across runs.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// Names are unique per registry; a second tool with the same name is
    /// rejected and the first registration stays in place.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), ToolError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register an already shared tool.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        tracing::debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Descriptors of all tools, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|t| t.describe()).collect()
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Fetch a required string argument.
pub fn required_str<'a>(arguments: &'a ToolArguments, name: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
}

/// Render a tool result as observation text.
///
/// Strings are used verbatim; anything else is rendered as compact JSON.
pub fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Vec<ToolParameter> {
            vec![ToolParameter::required("text", "str", "Text to echo")]
        }
        async fn execute(&self, arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
            let text = required_str(&arguments, "text")?;
            Ok(serde_json::Value::String(text.to_string()))
        }
    }

    struct OtherEcho;

    #[async_trait]
    impl Tool for OtherEcho {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "A second echo"
        }
        fn parameters(&self) -> Vec<ToolParameter> {
            vec![]
        }
        async fn execute(&self, _arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let err = registry.register(OtherEcho).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(ref n) if n == "echo"));

        // The original registration survives.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("echo").unwrap().description(), "Echoes back the input");
    }

    #[test]
    fn descriptors_keep_parameter_order() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        let defs = registry.descriptors();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].parameters[0].name, "text");
        assert!(defs[0].parameters[0].required);
    }

    #[tokio::test]
    async fn execute_with_named_arguments() {
        let tool = EchoTool;
        let mut args = ToolArguments::new();
        args.insert("text".into(), "hello world".into());
        let value = tool.execute(args).await.unwrap();
        assert_eq!(render_value(&value), "hello world");
    }

    #[tokio::test]
    async fn missing_argument_is_invalid() {
        let err = EchoTool.execute(ToolArguments::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn render_structured_value_as_json() {
        let value = serde_json::json!({"result": 4});
        assert_eq!(render_value(&value), r#"{"result":4}"#);
        assert_eq!(render_value(&serde_json::json!(4)), "4");
    }
}
