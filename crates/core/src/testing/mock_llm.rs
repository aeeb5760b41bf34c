//! Mock completion client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// A recorded completion call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCompletion {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
}

/// Mock implementation of the LlmClient trait.
///
/// Replies are served in order; once the queue is empty every call returns
/// the fallback reply.
///
/// # Example
///
/// ```rust,ignore
/// use briefwright_core::testing::MockLlmClient;
///
/// let llm = MockLlmClient::new()
///     .with_reply("Tone: Data-Driven\nAngle: Hard stats")
///     .with_failure(LlmError::Http("connection reset".into()));
///
/// // First call succeeds, second fails, later calls get the fallback.
/// assert_eq!(llm.calls().len(), 0);
/// ```
#[derive(Debug)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: String,
    calls: Mutex<Vec<RecordedCompletion>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: "mock completion".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failing reply.
    pub fn with_failure(self, error: LlmError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Reply used once the queue is drained.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<RecordedCompletion> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.lock().unwrap().push(RecordedCompletion {
            system: request.system.clone(),
            prompt: request.prompt.clone(),
            temperature: request.temperature,
        });

        let next = self.replies.lock().unwrap().pop_front();
        let text = match next {
            Some(reply) => reply?,
            None => self.fallback.clone(),
        };

        Ok(CompletionResponse {
            text,
            usage: LlmUsage::default(),
            model: "mock-model".to_string(),
        })
    }
}
