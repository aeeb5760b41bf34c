//! Picks the tone and angle for a pitch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::metrics::STAGE_OUTCOMES;

const SYSTEM_PROMPT: &str = "You are a helpful PR strategist.";

pub const STRATEGY_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Missing OpenAI API Key")]
    MissingCredential,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Strategy as returned by the model.
///
/// `tone` and `angle` are parsed from `Tone:` / `Angle:` lines when the
/// model follows the requested format; `raw` is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
}

impl Strategy {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let tone = labelled_line(&raw, "tone");
        let angle = labelled_line(&raw, "angle");
        Self { raw, tone, angle }
    }
}

/// Value of the first `Label: value` line, ignoring case and markdown emphasis.
fn labelled_line(text: &str, label: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let line = line.trim().trim_start_matches(['*', '-', '#', ' ']);
        let (key, value) = line.split_once(':')?;
        if !key.trim_matches('*').trim().eq_ignore_ascii_case(label) {
            return None;
        }
        let value = value.trim().trim_matches('*').trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[derive(Clone)]
pub struct Strategist {
    client: Option<Arc<dyn LlmClient>>,
}

impl Strategist {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, query: &str, profile: &str) -> Result<Strategy, StrategyError> {
        let client = self.client.as_ref().ok_or(StrategyError::MissingCredential)?;

        info!(query, "Analyzing pitch strategy");
        let request = CompletionRequest::new(build_prompt(query, profile))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(STRATEGY_TEMPERATURE);

        match client.complete(request).await {
            Ok(response) => {
                STAGE_OUTCOMES.with_label_values(&["strategy", "ok"]).inc();
                let strategy = Strategy::parse(response.text);
                info!(tone = ?strategy.tone, angle = ?strategy.angle, "Strategy chosen");
                Ok(strategy)
            }
            Err(e) => {
                warn!(query, error = %e, "Strategy analysis failed");
                STAGE_OUTCOMES.with_label_values(&["strategy", "error"]).inc();
                Err(e.into())
            }
        }
    }
}

fn build_prompt(query: &str, profile: &str) -> String {
    format!(
        r#"Role: Expert PR Strategist.
Query: "{query}"
My Profile: "{profile}"

Task: Define the strategy most likely to get this response featured.
1. What is the best TONE? (e.g. Authoritative, Empathetic, Data-Driven)
2. What is the best ANGLE? (e.g. Contrarian view, Personal story, Hard stats)

Output Format (strict text):
Tone: [Tone]
Angle: [Angle]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlmClient;

    #[test]
    fn test_parse_plain_lines() {
        let strategy = Strategy::parse("Tone: Data-Driven\nAngle: Hard stats");
        assert_eq!(strategy.tone.as_deref(), Some("Data-Driven"));
        assert_eq!(strategy.angle.as_deref(), Some("Hard stats"));
    }

    #[test]
    fn test_parse_markdown_lines() {
        let strategy = Strategy::parse("**Tone:** Empathetic\n- **Angle:** Personal story\n");
        assert_eq!(strategy.tone.as_deref(), Some("Empathetic"));
        assert_eq!(strategy.angle.as_deref(), Some("Personal story"));
    }

    #[test]
    fn test_parse_free_text_keeps_raw() {
        let strategy = Strategy::parse("Be bold and cite numbers.");
        assert_eq!(strategy.tone, None);
        assert_eq!(strategy.angle, None);
        assert_eq!(strategy.raw, "Be bold and cite numbers.");
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let err = Strategist::new(None).analyze("q", "p").await.unwrap_err();
        assert!(matches!(err, StrategyError::MissingCredential));
        assert_eq!(err.to_string(), "Missing OpenAI API Key");
    }

    #[tokio::test]
    async fn test_analyze_uses_profile_and_temperature() {
        let llm = Arc::new(MockLlmClient::new().with_reply("Tone: Authoritative\nAngle: Hard stats"));
        let strategist = Strategist::new(Some(llm.clone()));

        let strategy = strategist
            .analyze("Is solar worth it?", "Energy consultant")
            .await
            .unwrap();

        assert_eq!(strategy.tone.as_deref(), Some("Authoritative"));
        let calls = llm.calls();
        assert_eq!(calls[0].temperature, 0.7);
        assert!(calls[0].prompt.contains("\"Energy consultant\""));
    }

    #[tokio::test]
    async fn test_completion_failure_is_error() {
        let llm = Arc::new(MockLlmClient::new().with_failure(LlmError::Http("reset".to_string())));
        let err = Strategist::new(Some(llm)).analyze("q", "p").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: reset");
    }
}
