//! Tool registration and execution errors.

use thiserror::Error;

/// Errors that can occur while registering or executing a tool.
///
/// Builtin tools report provider and evaluation failures as text, so these
/// only cover failures of the tool-call contract itself.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Invalid arguments provided to tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A tool with the same name is already registered.
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}
