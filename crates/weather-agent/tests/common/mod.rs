//! Common test utilities for integration tests.

use weather_agent::config::{AgentConfig, ModelConfig, WeatherConfig};
use weather_agent::Config;
use wiremock::MockServer;

/// Configuration pointing the model and weather provider at mock servers.
pub fn test_config(model_server: &MockServer, weather_server: &MockServer) -> Config {
    Config {
        google_api_key: Some("test-google-key".into()),
        openweather_api_key: Some("test-weather-key".into()),
        model: ModelConfig {
            model_id: "test-model".into(),
            base_url: model_server.uri(),
            ..ModelConfig::default()
        },
        weather: WeatherConfig {
            base_url: format!("{}/data/2.5/weather", weather_server.uri()),
        },
        agent: AgentConfig {
            system_prompt: "You are a test assistant.".into(),
            ..AgentConfig::default()
        },
    }
}

/// Chat completion whose message is plain text.
pub fn text_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-text",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Chat completion requesting a single tool call.
pub fn tool_call_completion(id: &str, name: &str, arguments: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-tool",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}
