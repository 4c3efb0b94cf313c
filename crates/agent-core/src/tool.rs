//! Tool System
//!
//! Tools are named capabilities the reasoning loop can invoke mid-conversation.
//! Every tool takes free-form argument text (usually a JSON object) and returns
//! text that is folded back into the conversation. Failures are returned as
//! `Err` and the loop turns them into descriptive text for the model.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request parsed from an LLM response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Raw argument text handed to the tool
    pub arguments: String,
}

/// Wire shape of a tool directive: `{"tool": "...", "arguments": ...}`
#[derive(Deserialize)]
struct ToolDirective {
    #[serde(alias = "name")]
    tool: String,
    #[serde(default, alias = "args", alias = "input")]
    arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse a directive JSON document. Object arguments are re-serialized to
    /// text, string arguments are passed through untouched.
    pub fn from_directive(json: &str) -> Option<Self> {
        let directive: ToolDirective = serde_json::from_str(json).ok()?;
        if directive.tool.trim().is_empty() {
            return None;
        }

        let arguments = match directive.arguments {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => "{}".to_string(),
            other => other.to_string(),
        };

        Some(Self::new(directive.tool.trim(), arguments))
    }
}

/// Outcome of one tool invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolOutcome {
    Ok,
    Error,
}

/// Record of a tool call made during a reasoning run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool that was called
    pub tool: String,

    /// Argument text passed to the tool
    pub arguments: String,

    /// Result text (or error description) folded back into the conversation
    pub result: String,

    pub outcome: ToolOutcome,
}

impl ToolInvocation {
    pub fn is_ok(&self) -> bool {
        self.outcome == ToolOutcome::Ok
    }

    /// Text of the tool-role message for this invocation
    pub fn to_message_content(&self) -> String {
        match self.outcome {
            ToolOutcome::Ok => format!("[Tool '{}' returned]\n{}", self.tool, self.result),
            ToolOutcome::Error => format!("[Tool '{}' failed]\n{}", self.tool, self.result),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON type (string, number, integer, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl ParameterSchema {
    pub fn required(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    pub fn optional(
        name: &str,
        param_type: &str,
        description: &str,
        default: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: false,
            default: Some(default),
        }
    }
}

/// Tool usage contract shown to the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Example argument text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's usage contract
    fn schema(&self) -> ToolSchema;

    /// Run the tool on raw argument text
    async fn invoke(&self, arguments: &str) -> Result<String>;
}

/// Deserialize tool argument text into a typed input, reporting shape errors
/// as [`AgentError::ToolValidation`].
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: &str) -> Result<T> {
    serde_json::from_str(arguments.trim()).map_err(|e| {
        AgentError::ToolValidation(format!(
            "{} expects a JSON object argument ({}); got: {}",
            tool,
            e,
            arguments.trim()
        ))
    })
}

/// Registry for available tools, keyed by tool name
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_shared(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        if self.tools.insert(schema.name.clone(), tool).is_some() {
            tracing::warn!(tool = %schema.name, "Replacing previously registered tool");
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, call: &ToolCall) -> Result<String> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.invoke(&call.arguments).await
    }

    /// All tool schemas, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<_> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn generate_prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("Call a tool by replying with ONLY a fenced block in this exact format:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");
        prompt.push_str("Call one tool at a time and wait for its result.\n\n");

        for schema in self.schemas() {
            let _ = writeln!(prompt, "### {}", schema.name);
            let _ = writeln!(prompt, "{}", schema.description);

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    let _ = writeln!(
                        prompt,
                        "- `{}` ({}){}: {}",
                        param.name, param.param_type, required, param.description
                    );
                }
            }
            if let Some(example) = &schema.example {
                let _ = writeln!(prompt, "Example arguments: `{}`", example);
            }
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the argument text back".into(),
                parameters: vec![ParameterSchema::required("text", "string", "Text to echo")],
                example: Some(r#"{"text": "hi"}"#.into()),
            }
        }

        async fn invoke(&self, arguments: &str) -> Result<String> {
            Ok(arguments.to_string())
        }
    }

    #[test]
    fn test_directive_with_object_arguments() {
        let call = ToolCall::from_directive(r#"{"tool": "calculator", "arguments": {"daily_costs": [1, 2]}}"#)
            .unwrap();
        assert_eq!(call.name, "calculator");
        let args: serde_json::Value = serde_json::from_str(&call.arguments).unwrap();
        assert_eq!(args["daily_costs"][1], 2);
    }

    #[test]
    fn test_directive_with_string_arguments() {
        let call = ToolCall::from_directive(r#"{"tool": "weather_service", "arguments": "{\"city\": \"Beijing\"}"}"#)
            .unwrap();
        assert_eq!(call.arguments, r#"{"city": "Beijing"}"#);
    }

    #[test]
    fn test_directive_requires_tool_name() {
        assert!(ToolCall::from_directive(r#"{"arguments": {}}"#).is_none());
        assert!(ToolCall::from_directive(r#"{"tool": "  "}"#).is_none());
        assert!(ToolCall::from_directive("not json").is_none());
    }

    #[tokio::test]
    async fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());

        let out = registry.invoke(&ToolCall::new("echo", "abc")).await.unwrap();
        assert_eq!(out, "abc");

        let err = registry.invoke(&ToolCall::new("nope", "")).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let section = registry.generate_prompt_section();
        assert!(section.contains("### echo"));
        assert!(section.contains("`text` (string) (required)"));
        assert!(section.contains("```tool"));
    }

    #[test]
    fn test_invocation_message_content() {
        let inv = ToolInvocation {
            tool: "calculator".into(),
            arguments: "{}".into(),
            result: "bad input".into(),
            outcome: ToolOutcome::Error,
        };
        assert!(!inv.is_ok());
        assert!(inv.to_message_content().starts_with("[Tool 'calculator' failed]"));
    }

    #[test]
    fn test_parse_arguments_reports_validation_error() {
        #[derive(Debug, Deserialize)]
        struct Input {
            #[allow(dead_code)]
            city: String,
        }
        let err = parse_arguments::<Input>("weather_service", "{\"days\": 3}").unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }
}
