//! OpenAI-compatible chat completions client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};
use crate::config::CompletionConfig;
use crate::http::{FetchError, FetchRequest, ResilientClient};
use crate::metrics::{observe_external, LLM_TOKENS};

/// Chat completions client.
///
/// Requests go through [`ResilientClient`], so transient 5xx answers are
/// retried like any other outbound call.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: ResilientClient,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(http: ResilientClient, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = CompletionConfig::default();
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            api_base: defaults.api_base,
            timeout: Duration::from_secs(defaults.timeout_secs as u64),
        }
    }

    /// Client for the configured endpoint and model.
    pub fn from_config(
        http: ResilientClient,
        config: &CompletionConfig,
        api_key: impl Into<String>,
    ) -> Self {
        Self::new(http, api_key, config.model.clone())
            .with_api_base(config.api_base.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs as u64))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn to_llm_error(error: FetchError) -> LlmError {
    match error {
        FetchError::Status { status, body } => {
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            LlmError::Api { status, message }
        }
        e @ FetchError::RetriesExhausted { .. } => LlmError::Api {
            status: e.status().unwrap_or_default(),
            message: e.to_string(),
        },
        FetchError::Decode(message) => LlmError::Json(message),
        other => LlmError::Http(other.to_string()),
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt,
        });

        let body = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
        };
        let body = serde_json::to_value(&body).map_err(|e| LlmError::Json(e.to_string()))?;

        let fetch = FetchRequest::post_json(
            format!("{}/chat/completions", self.api_base.trim_end_matches('/')),
            body,
        )
        .with_bearer_auth(self.api_key.as_str())
        .with_timeout(self.timeout);

        let start = Instant::now();
        let result = self.http.fetch(&fetch).await;
        observe_external(
            "completion",
            "chat",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        let response: ChatResponse = result.map_err(to_llm_error)?.json().map_err(to_llm_error)?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        let usage = response
            .usage
            .map(|u| LlmUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        LLM_TOKENS
            .with_label_values(&["openai", "input"])
            .inc_by(usage.input_tokens as u64);
        LLM_TOKENS
            .with_label_values(&["openai", "output"])
            .inc_by(usage.output_tokens as u64);

        debug!(
            model = %self.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Completion finished"
        );

        Ok(CompletionResponse {
            text,
            usage,
            model: response.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}
