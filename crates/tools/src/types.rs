//! Tool type definitions following OpenAI function calling schema.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata advertising a tool to the orchestrator.
///
/// Every key in `inputs` is a parameter the tool's `execute` reads from its
/// JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// Unique tool name (e.g., "get_current_weather").
    pub name: String,
    /// Human-readable description for the model.
    pub description: String,
    /// Parameter name to declared input.
    pub inputs: BTreeMap<String, ToolInput>,
    /// Declared output type (always "string" for the builtins).
    pub output_type: String,
}

/// A single declared tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInput {
    /// What the parameter means, with an example.
    pub description: String,
    /// JSON Schema type name.
    #[serde(rename = "type")]
    pub input_type: String,
}

impl ToolDescriptor {
    /// Create a descriptor with no inputs and a string output.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            inputs: BTreeMap::new(),
            output_type: "string".into(),
        }
    }

    /// Declare an input parameter.
    pub fn with_input(
        mut self,
        name: impl Into<String>,
        input_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.inputs.insert(
            name.into(),
            ToolInput {
                description: description.into(),
                input_type: input_type.into(),
            },
        );
        self
    }

    /// Set the declared output type.
    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    /// Render as an OpenAI function definition. All inputs are required.
    pub fn to_definition(&self) -> ToolDefinition {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .inputs
            .iter()
            .map(|(name, input)| {
                (
                    name.clone(),
                    serde_json::json!({
                        "type": input.input_type,
                        "description": input.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self.inputs.keys().map(String::as_str).collect();

        ToolDefinition {
            tool_type: "function".into(),
            function: FunctionDefinition {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }),
            },
        }
    }
}

/// Tool definition sent to LLM (OpenAI-compatible schema).
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details.
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    /// Function name (e.g., "calculate").
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for parameters.
    pub parameters: serde_json::Value,
}

/// Tool call requested by LLM.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    /// Unique ID for this call.
    pub id: String,
    /// Always "function".
    #[serde(rename = "type")]
    pub call_type: String,
    /// Function to call.
    pub function: FunctionCall,
}

/// Function call details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// JSON string of arguments.
    pub arguments: String,
}

/// Result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// ID of the tool call this responds to.
    pub tool_call_id: String,
    /// Result content (or error message).
    pub content: String,
    /// Whether execution succeeded.
    pub success: bool,
}

impl ToolResult {
    /// Create a successful result.
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            success: true,
        }
    }

    /// Create an error result.
    pub fn error(tool_call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: message.into(),
            success: false,
        }
    }
}

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the descriptor advertised to the orchestrator.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Get the tool name.
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Get the tool definition for the LLM.
    fn definition(&self) -> ToolDefinition {
        self.descriptor().to_definition()
    }

    /// Line announcing an invocation, emitted before `execute` runs.
    fn progress_message(&self, _arguments: &str) -> Option<String> {
        None
    }

    /// Execute the tool with JSON arguments.
    async fn execute(&self, arguments: &str) -> Result<String, ToolError>;
}
