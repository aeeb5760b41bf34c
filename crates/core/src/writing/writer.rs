//! Writes the final pitch in the user's voice.

use std::sync::Arc;

use regex_lite::Regex;
use tracing::{debug, info, warn};

use super::strategist::Strategy;
use crate::llm::{CompletionRequest, LlmClient};
use crate::metrics::STAGE_OUTCOMES;

pub const WRITER_TEMPERATURE: f32 = 0.7;

const GLOBAL_MARKET: &str = "Global Market";
const MARKET_PLACEHOLDER: &str = "the market";

/// Everything the writer needs for one pitch.
#[derive(Debug, Clone, Copy)]
pub struct PitchInput<'a> {
    pub query: &'a str,
    pub research_brief: &'a str,
    pub strategy: Option<&'a Strategy>,
    pub country: Option<&'a str>,
    pub profile: &'a str,
}

#[derive(Clone)]
pub struct PitchWriter {
    client: Option<Arc<dyn LlmClient>>,
}

impl PitchWriter {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        Self { client }
    }

    /// Never fails; errors come back inside the returned text.
    pub async fn write(&self, input: PitchInput<'_>) -> String {
        let Some(client) = &self.client else {
            STAGE_OUTCOMES.with_label_values(&["writer", "degraded"]).inc();
            return "Error: No OpenAI API Key provided.".to_string();
        };

        let country = input.country.map(str::trim).filter(|c| !c.is_empty());
        info!(query = input.query, country = ?country, "Writing pitch");

        let request = CompletionRequest::new(format!(
            "USER QUERY: {}\n\nTASK: Write the response now.",
            input.query
        ))
        .with_system(build_instructions(&input, country.unwrap_or(GLOBAL_MARKET)))
        .with_temperature(WRITER_TEMPERATURE);

        match client.complete(request).await {
            Ok(response) => {
                STAGE_OUTCOMES.with_label_values(&["writer", "ok"]).inc();
                match country {
                    Some(country) => mask_country(&response.text, country),
                    None => response.text,
                }
            }
            Err(e) => {
                warn!(error = %e, "Pitch writing failed");
                STAGE_OUTCOMES.with_label_values(&["writer", "degraded"]).inc();
                format!("Writer Error: {}", e)
            }
        }
    }
}

/// Replace case-insensitive occurrences of `country` with a neutral phrase.
///
/// Best effort only: abbreviations, demonyms and city names are not caught.
pub fn mask_country(text: &str, country: &str) -> String {
    let pattern = format!("(?i){}", regex_lite::escape(country));
    match Regex::new(&pattern) {
        Ok(re) if re.is_match(text) => {
            debug!(country, "Masking country name in pitch");
            re.replace_all(text, MARKET_PLACEHOLDER).into_owned()
        }
        _ => text.to_string(),
    }
}

fn build_instructions(input: &PitchInput<'_>, target_market: &str) -> String {
    let strategy = input
        .strategy
        .map(|s| s.raw.as_str())
        .unwrap_or("Professional");

    format!(
        r#"### ROLE
You are {profile}.
Strategy/Tone: {strategy}

### CONTEXT (internal knowledge only)
- You are writing for an audience in: {target_market}.
- Use what you know about {target_market} (regulation, currency, habits) to shape the argument.

### NEGATIVE CONSTRAINTS
1. Never write the word "{target_market}", specific city names or regions.
2. Do not say "Here in..." or "In our country".
3. Do not repeat the user's question at the start.
4. Do not use hyphens or complex symbols.

### WRITING RULES
1. Open in the first person ("I predict", "In my experience"); use the third person for facts.
2. Use flowing, professional language with connecting words.
3. British English.
4. About 150 words, no sentence longer than 25 words.

### RESEARCH DATA
{research}"#,
        profile = input.profile,
        research = input.research_brief,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::testing::MockLlmClient;

    fn input<'a>(country: Option<&'a str>, strategy: Option<&'a Strategy>) -> PitchInput<'a> {
        PitchInput {
            query: "Will heat pumps take off?",
            research_brief: "Brief body",
            strategy,
            country,
            profile: "HVAC engineer",
        }
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let text = PitchWriter::new(None).write(input(None, None)).await;
        assert_eq!(text, "Error: No OpenAI API Key provided.");
    }

    #[tokio::test]
    async fn test_country_is_masked_case_insensitively() {
        let llm = Arc::new(
            MockLlmClient::new().with_reply("I predict GERMANY will lead. Germany's rules help."),
        );
        let text = PitchWriter::new(Some(llm))
            .write(input(Some("Germany"), None))
            .await;
        assert_eq!(text, "I predict the market will lead. the market's rules help.");
    }

    #[tokio::test]
    async fn test_instructions_carry_market_and_strategy() {
        let llm = Arc::new(MockLlmClient::new().with_reply("ok"));
        let strategy = Strategy::parse("Tone: Empathetic\nAngle: Personal story");
        PitchWriter::new(Some(llm.clone()))
            .write(input(None, Some(&strategy)))
            .await;

        let calls = llm.calls();
        let system = calls[0].system.clone().unwrap();
        assert!(system.contains("You are HVAC engineer."));
        assert!(system.contains("Global Market"));
        assert!(system.contains("Tone: Empathetic"));
        assert!(system.contains("Brief body"));
        assert_eq!(
            calls[0].prompt,
            "USER QUERY: Will heat pumps take off?\n\nTASK: Write the response now."
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_inline() {
        let llm = Arc::new(MockLlmClient::new().with_failure(LlmError::EmptyResponse));
        let text = PitchWriter::new(Some(llm)).write(input(None, None)).await;
        assert_eq!(text, "Writer Error: Empty response from model");
    }

    #[test]
    fn test_mask_country_escapes_pattern() {
        assert_eq!(mask_country("Visit St. Lucia", "St. Lucia"), "Visit the market");
        assert_eq!(mask_country("Visit Stx Lucia", "St. Lucia"), "Visit Stx Lucia");
    }
}
