//! Condenses raw source digests into a research brief.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::{CompletionRequest, LlmClient};
use crate::metrics::STAGE_OUTCOMES;

const SYSTEM_PROMPT: &str = "You are a research analyst summarizing complex data.";

/// Temperature for brief generation.
pub const SYNTHESIS_TEMPERATURE: f32 = 0.5;

/// Turns web and scholar digests into a structured brief.
///
/// Without a completion client the raw digests are echoed back so the
/// caller still gets something to read.
#[derive(Clone)]
pub struct Synthesizer {
    client: Option<Arc<dyn LlmClient>>,
}

impl Synthesizer {
    pub fn new(client: Option<Arc<dyn LlmClient>>) -> Self {
        Self { client }
    }

    /// Never fails; errors come back inside the returned text.
    pub async fn summarize(&self, query: &str, web_text: &str, scholar_text: &str) -> String {
        let Some(client) = &self.client else {
            warn!(query, "No completion credential, returning raw digests");
            STAGE_OUTCOMES.with_label_values(&["synthesis", "degraded"]).inc();
            return format!("OpenAI Key Missing. Raw Data:\n{}\n{}", web_text, scholar_text);
        };

        info!(query, model = client.model(), "Synthesizing research brief");
        let request = CompletionRequest::new(build_prompt(query, web_text, scholar_text))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(SYNTHESIS_TEMPERATURE);

        match client.complete(request).await {
            Ok(response) => {
                STAGE_OUTCOMES.with_label_values(&["synthesis", "ok"]).inc();
                response.text
            }
            Err(e) => {
                warn!(query, error = %e, "Synthesis failed");
                STAGE_OUTCOMES.with_label_values(&["synthesis", "degraded"]).inc();
                format!("Summarization Failed: {}", e)
            }
        }
    }
}

fn build_prompt(query: &str, web_text: &str, scholar_text: &str) -> String {
    format!(
        r#"ROLE: Lead Research Analyst.
TASK: Turn the raw research below into a structured Research Brief of 500-600 words.
QUERY: "{query}"

RAW WEB DATA:
{web_text}

RAW ACADEMIC PAPERS (Google Scholar PDFs):
{scholar_text}

OUTPUT GUIDELINES:
1. Consolidate: merge overlapping points from web and academic sources.
2. Authority: favour statistics from high authority sources and the papers.
3. Structure:
   - Executive Summary (50 words)
   - Key Trends & Statistics (bullet points)
   - Academic/Deep Insights (specific findings from the papers)
   - Strategic Angle (the unique insight)
4. Length: strictly 500-600 words."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::testing::MockLlmClient;

    #[tokio::test]
    async fn test_missing_client_echoes_raw_data() {
        let synthesizer = Synthesizer::new(None);
        let brief = synthesizer.summarize("q", "WEB", "SCHOLAR").await;
        assert_eq!(brief, "OpenAI Key Missing. Raw Data:\nWEB\nSCHOLAR");
    }

    #[tokio::test]
    async fn test_brief_from_completion() {
        let llm = Arc::new(MockLlmClient::new().with_reply("The brief."));
        let synthesizer = Synthesizer::new(Some(llm.clone()));

        let brief = synthesizer
            .summarize("solar adoption", "web digest", "scholar digest")
            .await;

        assert_eq!(brief, "The brief.");
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, 0.5);
        assert_eq!(calls[0].system.as_deref(), Some(SYSTEM_PROMPT));
        assert!(calls[0].prompt.contains("\"solar adoption\""));
        assert!(calls[0].prompt.contains("web digest"));
        assert!(calls[0].prompt.contains("scholar digest"));
    }

    #[tokio::test]
    async fn test_failure_is_reported_inline() {
        let llm = Arc::new(MockLlmClient::new().with_failure(LlmError::Api {
            status: 429,
            message: "Rate limit reached".to_string(),
        }));
        let synthesizer = Synthesizer::new(Some(llm));

        let brief = synthesizer.summarize("q", "w", "s").await;
        assert_eq!(
            brief,
            "Summarization Failed: API error: 429 - Rate limit reached"
        );
    }
}
