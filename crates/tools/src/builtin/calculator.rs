//! Calculator tool backed by the restricted arithmetic evaluator.

use super::expression::evaluate;
use crate::error::ToolError;
use crate::types::{Tool, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;

/// Evaluate `expression` and describe the outcome. Never fails.
pub fn calculate(expression: &str) -> String {
    match evaluate(expression) {
        Ok(result) => format!("The result of '{}' is {}.", expression, result),
        Err(e) => format!("Could not evaluate the expression. Error: {}", e),
    }
}

/// Calculator tool for evaluating arithmetic expressions.
pub struct CalculatorTool {
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct CalculatorArgs {
    expression: String,
}

impl CalculatorTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "calculate",
                "Evaluates a simple mathematical expression like '5 * 10' or '100 + 5'.",
            )
            .with_input(
                "expression",
                "string",
                "The mathematical expression to evaluate, e.g., '5 * 123'",
            ),
        }
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn progress_message(&self, arguments: &str) -> Option<String> {
        let args: CalculatorArgs = serde_json::from_str(arguments).ok()?;
        Some(format!(
            "--- CalculatorTool running: Evaluating '{}' ---",
            args.expression
        ))
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: CalculatorArgs = serde_json::from_str(arguments)?;
        Ok(calculate(&args.expression))
    }
}
