//! Tool contract, registry and builtin tools for the weather agent.

mod error;
mod types;
mod registry;
mod executor;
pub mod builtin;

pub use error::ToolError;
pub use types::*;
pub use registry::ToolRegistry;
pub use executor::{ProgressSink, ToolExecutor};
