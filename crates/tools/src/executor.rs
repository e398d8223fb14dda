//! Tool executor that turns every outcome into text for the model.

use crate::registry::ToolRegistry;
use crate::types::{ToolCall, ToolResult};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Receives progress lines announcing tool invocations.
pub type ProgressSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Executor for running tool calls against a registry.
///
/// `execute` never fails: unknown tools and tool errors are reported back to
/// the model as result text.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    progress: Option<ProgressSink>,
}

impl ToolExecutor {
    /// Create a new executor.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            progress: None,
        }
    }

    /// Send progress lines to `sink` before each invocation.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Execute a tool call.
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        let tool_name = &tool_call.function.name;
        info!(tool = %tool_name, "Executing tool");

        let tool = match self.registry.get_tool(tool_name) {
            Some(t) => t,
            None => {
                warn!(tool = %tool_name, "Tool not found");
                return ToolResult::error(
                    &tool_call.id,
                    format!("Tool '{}' not available", tool_name),
                );
            }
        };

        if let Some(message) = tool.progress_message(&tool_call.function.arguments) {
            info!(tool = %tool_name, progress = %message, "Tool progress");
            if let Some(sink) = &self.progress {
                sink(message.as_str());
            }
        }

        match tool.execute(&tool_call.function.arguments).await {
            Ok(content) => {
                info!(tool = %tool_name, len = content.len(), "Tool executed successfully");
                ToolResult::success(&tool_call.id, content)
            }
            Err(e) => {
                error!(tool = %tool_name, error = %e, "Tool execution failed");
                ToolResult::error(&tool_call.id, format!("Error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::types::{FunctionCall, Tool, ToolDescriptor};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoTool {
        descriptor: ToolDescriptor,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                descriptor: ToolDescriptor::new("echo", "Echo the text back")
                    .with_input("text", "string", "Text to echo"),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        fn progress_message(&self, arguments: &str) -> Option<String> {
            Some(format!("--- EchoTool running: {} ---", arguments))
        }

        async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
            let args: serde_json::Value = serde_json::from_str(arguments)?;
            args["text"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArguments("missing field `text`".into()))
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call-1".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new())).unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_execute_success() {
        let result = executor().execute(&call("echo", r#"{"text": "hi"}"#)).await;
        assert!(result.success);
        assert_eq!(result.tool_call_id, "call-1");
        assert_eq!(result.content, "hi");
    }

    #[tokio::test]
    async fn test_execute_tool_not_found() {
        let result = executor().execute(&call("nonexistent", "{}")).await;
        assert!(!result.success);
        assert_eq!(result.content, "Tool 'nonexistent' not available");
    }

    #[tokio::test]
    async fn test_tool_error_becomes_text() {
        let result = executor().execute(&call("echo", "not json")).await;
        assert!(!result.success);
        assert!(result.content.starts_with("Error: Invalid arguments"));
    }

    #[tokio::test]
    async fn test_progress_emitted_before_execution() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let executor = executor().with_progress(Arc::new(move |line: &str| {
            sink_seen.lock().unwrap().push(line.to_string());
        }));

        executor.execute(&call("echo", r#"{"text": "hi"}"#)).await;
        executor.execute(&call("missing", "{}")).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], r#"--- EchoTool running: {"text": "hi"} ---"#);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_progress_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        executor().execute(&call("echo", r#"{"text": "hi"}"#)).await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Tool progress"));
        assert!(output.contains(r#"progress=--- EchoTool running: {"text": "hi"} ---"#));
    }
}
