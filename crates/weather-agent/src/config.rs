//! Application configuration loaded from environment variables.

use crate::error::{AppError, AppResult};
use anyhow::Context;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
///
/// Credentials are read from `GOOGLE_API_KEY` and `OPENWEATHER_API_KEY`;
/// nested settings use `__` as separator (e.g. `MODEL__MODEL_ID`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Model provider API key
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Weather provider API key
    #[serde(default)]
    pub openweather_api_key: Option<String>,

    /// Model configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model identifier sent with every request
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_model_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Sampling temperature (provider default when unset)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Completion token cap per request (provider default when unset)
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// Current weather endpoint
    #[serde(default = "default_weather_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Maximum model round-trips per query
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// System prompt for the model
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// API keys, read once at startup and never mutated.
#[derive(Debug)]
pub struct Credentials {
    pub model_api_key: SecretString,
    pub weather_api_key: SecretString,
}

// Default implementations
impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            base_url: default_model_url(),
            timeout: default_timeout(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            system_prompt: default_system_prompt(),
            log_level: default_log_level(),
        }
    }
}

// Default value functions
fn default_model_id() -> String {
    "gemini-2.0-flash-lite".into()
}

fn default_model_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_weather_url() -> String {
    tools::builtin::DEFAULT_WEATHER_URL.into()
}

fn default_max_steps() -> usize {
    10
}

fn default_log_level() -> String {
    "warn".into()
}

fn default_system_prompt() -> String {
    r#"You are a helpful assistant that answers questions about places and the weather.

## Available Tools
- **find_location**: Turn a description like "the capital of France" into a city name
- **get_current_weather**: Get the live weather for a specific city name
- **calculate**: Evaluate arithmetic such as "5 * 10"

## Guidelines
- If the user does not name a specific city, call find_location first
- Never guess the weather; always call get_current_weather
- Use calculate rather than mental math
- If a tool reports an error, explain what happened in your answer"#
        .into()
}

/// Append the current date so the model can reason about "today".
pub fn build_system_prompt_with_date(base_prompt: &str) -> String {
    let now = chrono::Utc::now();
    format!(
        "{}\n\nCurrent date and time: {} UTC",
        base_prompt,
        now.format("%A, %B %d, %Y at %H:%M")
    )
}

fn is_table_name(name: &str) -> bool {
    ["MODEL", "WEATHER", "AGENT"]
        .iter()
        .any(|table| name.eq_ignore_ascii_case(table))
}

fn non_empty_secret(value: &Option<String>) -> Option<SecretString> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::new(v.to_string()))
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    pub fn load() -> AppResult<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(name, value)` pairs shaped like the
    /// process environment.
    ///
    /// Bare `MODEL`, `WEATHER` and `AGENT` variables are skipped; they name
    /// the nested tables and would otherwise clash with `MODEL__*` keys.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> AppResult<Self> {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .filter(|(name, _)| !is_table_name(name))
            .collect();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep values as strings so numeric-looking keys stay intact;
                    // numeric fields are converted during deserialization.
                    .try_parsing(false)
                    .source(Some(vars)),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        Ok(config)
    }

    /// Both API keys, or `MissingCredentials` if either is unset or empty.
    pub fn credentials(&self) -> AppResult<Credentials> {
        match (
            non_empty_secret(&self.google_api_key),
            non_empty_secret(&self.openweather_api_key),
        ) {
            (Some(model_api_key), Some(weather_api_key)) => Ok(Credentials {
                model_api_key,
                weather_api_key,
            }),
            _ => Err(AppError::MissingCredentials),
        }
    }
}
