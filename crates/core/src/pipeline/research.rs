//! Web, scholar and synthesis stages run in a fixed order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, Instrument};

use super::types::{Credentials, ProvenanceLog, ResearchOutcome};
use crate::config::Config;
use crate::http::ResilientClient;
use crate::llm::{LlmClient, OpenAiClient};
use crate::metrics::RUN_DURATION;
use crate::research::{
    BrowserProfile, DocumentParser, ResearchQuery, ScholarRetriever, SearchProvider, WebRetriever,
};
use crate::writing::Synthesizer;

/// Completion client for `api_key`, if one was supplied.
pub(crate) fn completion_client(
    config: &Config,
    http: &ResilientClient,
    api_key: Option<&str>,
) -> Option<Arc<dyn LlmClient>> {
    let key = api_key.filter(|k| !k.trim().is_empty())?;
    let client = OpenAiClient::from_config(http.clone(), &config.completion, key);
    debug!(provider = client.provider(), model = client.model(), "Completion client ready");
    Some(Arc::new(client) as Arc<dyn LlmClient>)
}

/// Runs web search, scholar search and synthesis for one query.
///
/// Every stage always runs: retrieval problems degrade the digest that is
/// handed to synthesis but never stop the run.
#[derive(Clone)]
pub struct ResearchPipeline {
    web: WebRetriever,
    scholar: ScholarRetriever,
    synthesizer: Synthesizer,
}

impl ResearchPipeline {
    pub fn new(web: WebRetriever, scholar: ScholarRetriever, synthesizer: Synthesizer) -> Self {
        Self {
            web,
            scholar,
            synthesizer,
        }
    }

    /// Wire up all stages from configuration and per-run credentials.
    pub fn from_config(
        config: &Config,
        http: &ResilientClient,
        credentials: &Credentials,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        let provider = SearchProvider::new(
            http.clone(),
            &config.search,
            credentials.search_api_key.clone(),
        );
        let scholar = ScholarRetriever::new(
            provider.clone(),
            http.clone(),
            parser,
            BrowserProfile::from_config(&config.http),
            Duration::from_secs(config.http.download_timeout_secs as u64),
        );
        let llm = completion_client(config, http, credentials.completion_api_key.as_deref());

        Self::new(WebRetriever::new(provider), scholar, Synthesizer::new(llm))
    }

    /// Run all stages. `strategy_context` is recorded for tracing only.
    pub async fn run(
        &self,
        query: &ResearchQuery,
        strategy_context: Option<&str>,
    ) -> ResearchOutcome {
        let span = info_span!(
            "research",
            query = %query.text,
            start_year = ?query.start_year,
            strategy = strategy_context.unwrap_or_default(),
        );

        async {
            let start = Instant::now();

            let web = self.web.search(&query.text).await;
            let scholar = self.scholar.search(&query.text, query.start_year).await;
            let brief = self
                .synthesizer
                .summarize(&query.text, &web.text, &scholar.text)
                .await;

            let elapsed = start.elapsed();
            RUN_DURATION
                .with_label_values(&["research"])
                .observe(elapsed.as_secs_f64());
            info!(
                web_links = web.links.len(),
                scholar_links = scholar.links.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Research run finished"
            );

            ResearchOutcome {
                brief,
                provenance: ProvenanceLog {
                    web_links: web.links,
                    scholar_links: scholar.links,
                },
                web_failure: web.failure,
                scholar_failure: scholar.failure,
                scholar_scan: scholar.scan,
            }
        }
        .instrument(span)
        .await
    }
}
