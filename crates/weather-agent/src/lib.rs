//! Weather agent: a model-driven assistant with weather, location and
//! calculator tools.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;

pub use agent::AgentRunner;
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
