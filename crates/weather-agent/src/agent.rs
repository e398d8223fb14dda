//! Agent runner - drives the model's tool-calling loop for one query.

use crate::config::{build_system_prompt_with_date, Config, Credentials};
use crate::error::AppResult;
use model_client::{
    FunctionDefinitionApi, Message, ModelClient, ModelError, ToolDefinition as ModelToolDefinition,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tools::builtin::{CalculatorTool, LocationTool, WeatherClient, WeatherTool};
use tools::{
    FunctionCall as ToolsFunctionCall, ProgressSink, ToolCall as ToolsToolCall, ToolExecutor,
    ToolRegistry,
};
use tracing::{debug, error, info, instrument, warn};

pub struct AgentRunner {
    model: ModelClient,
    tool_registry: Arc<ToolRegistry>,
    tool_executor: ToolExecutor,
    system_prompt: String,
    max_steps: usize,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl AgentRunner {
    pub fn new(
        model: ModelClient,
        tool_registry: Arc<ToolRegistry>,
        system_prompt: String,
        max_steps: usize,
    ) -> Self {
        Self {
            model,
            tool_executor: ToolExecutor::new(tool_registry.clone()),
            tool_registry,
            system_prompt,
            max_steps: max_steps.max(1),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build the model client and register the weather, location and
    /// calculator tools.
    pub fn initialize(config: &Config, credentials: &Credentials) -> AppResult<Self> {
        let model = ModelClient::new(
            credentials.model_api_key.expose_secret().as_str(),
            &config.model.base_url,
            &config.model.model_id,
            config.model.timeout,
        )?;

        let weather = WeatherClient::new(credentials.weather_api_key.expose_secret().as_str())
            .with_base_url(&config.weather.base_url);

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(WeatherTool::new(weather)))?;
        registry.register(Arc::new(LocationTool::new()))?;
        registry.register(Arc::new(CalculatorTool::new()))?;
        info!(tools = ?registry.list_tools(), model = %model.model(), "Agent initialized");

        Ok(Self::new(
            model,
            Arc::new(registry),
            config.agent.system_prompt.clone(),
            config.agent.max_steps,
        )
        .with_temperature(config.model.temperature)
        .with_max_tokens(config.model.max_tokens))
    }

    /// Send tool progress lines to `sink`.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.tool_executor = ToolExecutor::new(self.tool_registry.clone()).with_progress(sink);
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap on completion tokens per model call (provider default when unset).
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Names of the registered tools.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_registry.list_tools()
    }

    fn model_tools(&self) -> Vec<ModelToolDefinition> {
        self.tool_registry
            .get_definitions()
            .into_iter()
            .map(|d| ModelToolDefinition {
                tool_type: d.tool_type,
                function: FunctionDefinitionApi {
                    name: d.function.name,
                    description: d.function.description,
                    parameters: d.function.parameters,
                },
            })
            .collect()
    }

    /// Answer `query`, calling tools as the model requests them.
    ///
    /// Always returns text: model failures are turned into a short apology.
    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> String {
        let mut messages = vec![
            Message::system(build_system_prompt_with_date(&self.system_prompt)),
            Message::user(query),
        ];
        let model_tools = self.model_tools();
        let mut prompt_tokens = 0u32;
        let mut completion_tokens = 0u32;

        for step in 0..self.max_steps {
            // Withhold tools on the last step so the model has to answer
            let last_step = step + 1 == self.max_steps;
            let tools_to_offer = if !last_step && !model_tools.is_empty() {
                Some(&model_tools[..])
            } else {
                None
            };
            debug!(step, offering_tools = tools_to_offer.is_some(), "Agent step");

            let response = match self
                .model
                .chat_with_tools(
                    messages.clone(),
                    self.temperature,
                    self.max_tokens,
                    tools_to_offer,
                )
                .await
            {
                Ok(r) => r,
                Err(ModelError::RateLimit) => {
                    return "I'm receiving too many requests. Please wait a moment and try again."
                        .into();
                }
                Err(ModelError::EmptyResponse) => {
                    error!("Model returned empty response");
                    return "The AI service returned an empty response. Please try rephrasing your question."
                        .into();
                }
                Err(e) => {
                    error!("Model error: {}", e);
                    return "Sorry, I encountered an error connecting to the AI service. Please try again."
                        .into();
                }
            };

            debug!(step, finish_reason = %response.finish_reason, "Model responded");
            if let Some(usage) = &response.usage {
                prompt_tokens = prompt_tokens.saturating_add(usage.prompt_tokens);
                completion_tokens = completion_tokens.saturating_add(usage.completion_tokens);
            }

            let tool_calls = match response.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    let answer = response.content.unwrap_or_default();
                    info!(
                        step,
                        len = answer.len(),
                        prompt_tokens,
                        completion_tokens,
                        "Agent finished"
                    );
                    return answer;
                }
            };

            debug!("Model requested {} tool calls", tool_calls.len());
            messages.push(Message::assistant_with_tool_calls(
                response.content.clone(),
                tool_calls.clone(),
            ));

            for tool_call in tool_calls {
                let tools_call = ToolsToolCall {
                    id: tool_call.id.clone(),
                    call_type: tool_call.call_type.clone(),
                    function: ToolsFunctionCall {
                        name: tool_call.function.name.clone(),
                        arguments: tool_call.function.arguments.clone(),
                    },
                };

                let result = self.tool_executor.execute(&tools_call).await;
                if !result.success {
                    warn!("Tool {} failed: {}", tool_call.function.name, result.content);
                }
                messages.push(Message::tool_result(&tool_call.id, result.content));
            }
        }

        warn!(
            prompt_tokens,
            completion_tokens,
            "Max steps ({}) reached",
            self.max_steps
        );
        "I've reached my maximum number of steps for this request without a final answer.".into()
    }
}
