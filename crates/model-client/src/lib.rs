//! Chat completions client for OpenAI-compatible model APIs with tool calling.

mod client;
mod error;
mod types;

pub use client::ModelClient;
pub use error::ModelError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> ModelClient {
        ModelClient::new(
            "test-api-key",
            mock_server.uri(),
            "test-model",
            Duration::from_secs(30),
        )
        .unwrap()
    }

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".into(),
            function: FunctionDefinitionApi {
                name: "get_current_weather".into(),
                description: "Get the weather".into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {"city": {"type": "string", "description": "City"}},
                    "required": ["city"]
                }),
            },
        }
    }

    #[tokio::test]
    async fn test_chat_text_response() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I help you?"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 15,
                "total_tokens": 25
            }
        });

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let messages = vec![Message::user("Hello")];

        let result = client.chat_with_tools(messages, Some(0.7), None, None).await.unwrap();
        assert_eq!(result.content.as_deref(), Some("Hello! How can I help you?"));
        assert!(result.tool_calls.is_none());
        assert_eq!(result.finish_reason, "stop");
        assert_eq!(result.usage.unwrap().total_tokens, 25);
    }

    #[tokio::test]
    async fn test_chat_tool_calls() {
        let mock_server = MockServer::start().await;

        // Envelope fields trimmed the way some compatible providers send them.
        let response_body = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_current_weather",
                            "arguments": "{\"city\":\"Paris\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "get_current_weather"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let tools = vec![weather_tool()];
        let result = client
            .chat_with_tools(vec![Message::user("Weather in Paris?")], None, None, Some(&tools))
            .await
            .unwrap();

        let calls = result.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "get_current_weather");
        assert_eq!(calls[0].function.arguments, r#"{"city":"Paris"}"#);
        assert!(result.content.is_none());
        assert_eq!(result.finish_reason, "tool_calls");
    }

    #[tokio::test]
    async fn test_chat_empty_response() {
        let mock_server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "chatcmpl-123",
            "choices": [],
            "usage": null
        });

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .chat_with_tools(vec![Message::user("Hello")], Some(0.7), None, None)
            .await;
        assert!(matches!(result, Err(ModelError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_chat_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .chat_with_tools(vec![Message::user("Hello")], Some(0.7), None, None)
            .await;
        assert!(matches!(result, Err(ModelError::RateLimit)));
    }

    #[tokio::test]
    async fn test_chat_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .chat_with_tools(vec![Message::user("Hello")], Some(0.7), None, None)
            .await;
        assert!(matches!(result, Err(ModelError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad model"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .chat_with_tools(vec![Message::user("Hello")], None, None, None)
            .await;
        match result {
            Err(ModelError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad model");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_message_constructors() {
        let system = Message::system("You are a helpful assistant");
        assert!(matches!(system.role, Role::System));
        assert_eq!(system.content.as_deref(), Some("You are a helpful assistant"));

        let user = Message::user("Hello");
        assert!(matches!(user.role, Role::User));

        let tool = Message::tool_result("call_1", "Paris");
        assert!(matches!(tool.role, Role::Tool));
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));

        let json = serde_json::to_value(Message::assistant("Hi there!")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "Hi there!"}));
    }

    #[test]
    fn test_model_getter() {
        let client = ModelClient::new("key", "http://localhost:1/v1/", "gemini-2.0-flash-lite", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash-lite");
    }
}
