//! Strategy, research and writing chained into one pitch.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::research::{completion_client, ResearchPipeline};
use super::types::{Credentials, PitchReport, PitchRequest};
use crate::config::Config;
use crate::http::ResilientClient;
use crate::metrics::RUN_DURATION;
use crate::research::{DocumentParser, ResearchQuery};
use crate::writing::{PitchInput, PitchWriter, Strategist};

#[derive(Clone)]
pub struct PitchWorkflow {
    strategist: Strategist,
    research: ResearchPipeline,
    writer: PitchWriter,
}

impl PitchWorkflow {
    pub fn new(strategist: Strategist, research: ResearchPipeline, writer: PitchWriter) -> Self {
        Self {
            strategist,
            research,
            writer,
        }
    }

    pub fn from_config(
        config: &Config,
        http: &ResilientClient,
        credentials: &Credentials,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        let llm = completion_client(config, http, credentials.completion_api_key.as_deref());
        Self::new(
            Strategist::new(llm.clone()),
            ResearchPipeline::from_config(config, http, credentials, parser),
            PitchWriter::new(llm),
        )
    }

    /// Research is skipped when no strategy could be produced.
    pub async fn run(&self, request: &PitchRequest) -> PitchReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("pitch", %run_id, query = %request.query);

        async {
            let start = Instant::now();
            info!("Pitch run started");

            let report = match self.strategist.analyze(&request.query, &request.profile).await {
                Ok(strategy) => {
                    let query = ResearchQuery {
                        text: request.query.clone(),
                        start_year: request.year,
                    };
                    let outcome = self.research.run(&query, Some(&strategy.raw)).await;
                    let answer = self
                        .writer
                        .write(PitchInput {
                            query: &request.query,
                            research_brief: &outcome.brief,
                            strategy: Some(&strategy),
                            country: request.country.as_deref(),
                            profile: &request.profile,
                        })
                        .await;

                    PitchReport {
                        run_id,
                        source_links: Some(outcome.provenance.render()),
                        strategy: Some(strategy),
                        research_brief: Some(outcome.brief),
                        provenance: Some(outcome.provenance),
                        answer,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Skipping research, no strategy");
                    PitchReport {
                        run_id,
                        strategy: None,
                        research_brief: None,
                        provenance: None,
                        source_links: None,
                        answer: format!("Strategy Error: {}", e),
                    }
                }
            };

            let elapsed = start.elapsed();
            RUN_DURATION
                .with_label_values(&["pitch"])
                .observe(elapsed.as_secs_f64());
            info!(elapsed_ms = elapsed.as_millis() as u64, "Pitch run finished");
            report
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RetryPolicy;
    use crate::research::{BrowserProfile, ScholarRetriever, SearchProvider, WebRetriever};
    use crate::testing::MockLlmClient;
    use crate::testing::MockDocumentParser;
    use crate::writing::Synthesizer;
    use std::time::Duration;

    fn offline_research(llm: Arc<MockLlmClient>) -> ResearchPipeline {
        let http = ResilientClient::new(Duration::from_secs(1), RetryPolicy::none()).unwrap();
        let provider = SearchProvider::new(http.clone(), &Config::default().search, None);
        ResearchPipeline::new(
            WebRetriever::new(provider.clone()),
            ScholarRetriever::new(
                provider,
                http,
                Arc::new(MockDocumentParser::new()),
                BrowserProfile::default(),
                Duration::from_secs(1),
            ),
            Synthesizer::new(Some(llm)),
        )
    }

    fn request() -> PitchRequest {
        PitchRequest {
            query: "Are EVs cheaper to run?".to_string(),
            profile: "Fleet manager".to_string(),
            country: Some("Canada".to_string()),
            year: Some(2022),
        }
    }

    #[tokio::test]
    async fn test_full_run_orders_stages() {
        let llm = Arc::new(
            MockLlmClient::new()
                .with_reply("Tone: Data-Driven\nAngle: Hard stats")
                .with_reply("Brief about EVs")
                .with_reply("In my experience Canada fleets save money."),
        );
        let workflow = PitchWorkflow::new(
            Strategist::new(Some(llm.clone())),
            offline_research(llm.clone()),
            PitchWriter::new(Some(llm.clone())),
        );

        let report = workflow.run(&request()).await;

        assert_eq!(report.answer, "In my experience the market fleets save money.");
        assert_eq!(report.research_brief.as_deref(), Some("Brief about EVs"));
        assert_eq!(
            report.strategy.as_ref().and_then(|s| s.angle.as_deref()),
            Some("Hard stats")
        );
        assert!(report
            .source_links
            .as_deref()
            .unwrap()
            .starts_with("--- SCHOLAR PAPERS ---"));

        let calls = llm.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2].system.as_deref().unwrap().contains("Brief about EVs"));
    }

    #[tokio::test]
    async fn test_global_market_when_no_country() {
        let llm = Arc::new(
            MockLlmClient::new()
                .with_reply("Tone: Plain")
                .with_fallback("Canada is mentioned but not masked"),
        );
        let workflow = PitchWorkflow::new(
            Strategist::new(Some(llm.clone())),
            offline_research(llm.clone()),
            PitchWriter::new(Some(llm.clone())),
        );
        let request = PitchRequest {
            country: None,
            ..request()
        };

        let report = workflow.run(&request).await;

        assert_eq!(report.answer, "Canada is mentioned but not masked");
        let calls = llm.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2].system.as_deref().unwrap().contains("Global Market"));
    }

    #[tokio::test]
    async fn test_strategy_failure_skips_research() {
        let llm = Arc::new(MockLlmClient::new());
        let workflow = PitchWorkflow::new(
            Strategist::new(None),
            offline_research(llm.clone()),
            PitchWriter::new(Some(llm.clone())),
        );

        let report = workflow.run(&request()).await;

        assert_eq!(report.answer, "Strategy Error: Missing OpenAI API Key");
        assert!(report.research_brief.is_none());
        assert!(report.provenance.is_none());
        assert!(llm.calls().is_empty());
    }
}
