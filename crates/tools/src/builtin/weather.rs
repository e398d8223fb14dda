//! Weather tool using the OpenWeatherMap current weather API.

use crate::error::ToolError;
use crate::types::{Tool, ToolDescriptor};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Default OpenWeatherMap current weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Fetch failures, rendered to text by [`WeatherClient::current_weather`].
/// reqwest errors are stored without their URL since it carries the API key.
#[derive(Error, Debug)]
enum WeatherError {
    #[error("city not found")]
    NotFound,

    #[error("{0}")]
    Status(reqwest::Error),

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Request(reqwest::Error),

    #[error("malformed weather data: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: serde_json::Number,
}

/// Client for the weather provider. One GET per call, no retries or caching.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl WeatherClient {
    /// Create a client. An empty key is accepted and reported per call.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_WEATHER_URL.into(),
            api_key: SecretString::new(api_key.into()),
        }
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Describe the current weather in `city`. Every failure is returned as text.
    #[instrument(skip(self))]
    pub async fn current_weather(&self, city: &str) -> String {
        if self.api_key.expose_secret().is_empty() {
            return "Error: OpenWeatherMap API key is not set.".into();
        }
        let city = city.trim();
        if city.is_empty() {
            return "Error: City name is required.".into();
        }

        match self.fetch(city).await {
            Ok(report) => report,
            Err(WeatherError::NotFound) => format!(
                "Sorry, I couldn't find weather data for {}. Please check the city name.",
                city
            ),
            Err(WeatherError::Status(e)) => format!("An HTTP error occurred: {}", e),
            Err(WeatherError::Provider(message)) => {
                format!("Error from weather API: {}", message)
            }
            Err(e) => format!("An error occurred while fetching weather data: {}", e),
        }
    }

    async fn fetch(&self, city: &str) -> Result<String, WeatherError> {
        debug!(city = %city, "Fetching current weather");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.expose_secret().as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.without_url()))?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(city = %city, "Weather provider does not know city");
            return Err(WeatherError::NotFound);
        }

        let response = response
            .error_for_status()
            .map_err(|e| WeatherError::Status(e.without_url()))?;

        let data: Value = response
            .json()
            .await
            .map_err(|e| WeatherError::Request(e.without_url()))?;

        // The provider embeds its own status code, which can disagree with HTTP.
        if data.get("cod") != Some(&Value::from(200)) {
            let message = match data.get("message") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "Unknown error".into(),
            };
            return Err(WeatherError::Provider(message));
        }

        let current: CurrentWeather =
            serde_json::from_value(data).map_err(|e| WeatherError::Decode(e.to_string()))?;
        let condition = current
            .weather
            .first()
            .ok_or_else(|| WeatherError::Decode("no weather conditions".into()))?;

        Ok(format!(
            "The weather in {} is currently {} with a temperature of {}°C.",
            city, condition.description, current.main.temp
        ))
    }
}

/// Tool to get the current weather for a specific city.
pub struct WeatherTool {
    descriptor: ToolDescriptor,
    client: WeatherClient,
}

#[derive(Deserialize)]
struct WeatherArgs {
    city: String,
}

impl WeatherTool {
    pub fn new(client: WeatherClient) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "get_current_weather",
                "Get the real-time current weather for a given city. Should be used after you know the specific city name.",
            )
            .with_input(
                "city",
                "string",
                "The specific city name to get the weather for, e.g., 'Madrid'",
            ),
            client,
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn progress_message(&self, arguments: &str) -> Option<String> {
        let args: WeatherArgs = serde_json::from_str(arguments).ok()?;
        Some(format!(
            "--- WeatherTool running: Getting LIVE weather for {} ---",
            args.city
        ))
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: WeatherArgs = serde_json::from_str(arguments)?;
        Ok(self.client.current_weather(&args.city).await)
    }
}
