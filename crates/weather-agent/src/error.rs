//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("GOOGLE_API_KEY or OPENWEATHER_API_KEY not found.")]
    MissingCredentials,

    #[error("Model client error: {0}")]
    Model(#[from] model_client::ModelError),

    #[error("Tool error: {0}")]
    Tool(#[from] tools::ToolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
