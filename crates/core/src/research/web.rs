//! Web search retriever.

use tracing::{info, warn};

use super::authority::{classify, AuthorityTier};
use super::provider::{ProviderError, SearchProvider};
use super::types::{RetrievalFailure, SearchHit, SourceDigest};
use crate::metrics::STAGE_OUTCOMES;

/// Normal-tier entries kept in the digest.
pub const GENERAL_SOURCE_LIMIT: usize = 3;

/// Searches the web and splits results by source authority.
#[derive(Debug, Clone)]
pub struct WebRetriever {
    provider: SearchProvider,
}

impl WebRetriever {
    pub fn new(provider: SearchProvider) -> Self {
        Self { provider }
    }

    /// Never fails; problems come back as a degraded digest.
    pub async fn search(&self, query: &str) -> SourceDigest {
        info!(query, "Searching web sources");

        let digest = match self.provider.search_web(query).await {
            Ok(hits) => {
                let (text, links) = render_web_digest(&hits);
                SourceDigest::ok(text, links)
            }
            Err(ProviderError::MissingCredential) => SourceDigest::missing_credential(),
            Err(ProviderError::Reported(message)) => {
                warn!(query, error = %message, "Search provider reported an error");
                SourceDigest::failed(
                    format!("SerpApi Error: {}", message),
                    RetrievalFailure::Provider(message),
                )
            }
            Err(ProviderError::Fetch(e)) => {
                warn!(query, error = %e, "Web search failed");
                SourceDigest::failed(
                    format!("Web Search Failed: {}", e),
                    RetrievalFailure::Transport(e.to_string()),
                )
            }
        };

        let result = if digest.is_degraded() { "degraded" } else { "ok" };
        STAGE_OUTCOMES.with_label_values(&["web", result]).inc();
        digest
    }
}

/// Render hits into the tiered digest and the complete link log.
///
/// Links are logged in provider order whatever their tier.
pub fn render_web_digest(hits: &[SearchHit]) -> (String, Vec<String>) {
    let mut high = Vec::new();
    let mut general = Vec::new();
    let mut links = Vec::with_capacity(hits.len());

    for hit in hits {
        links.push(hit.link.clone());
        match classify(&hit.link) {
            AuthorityTier::High => high.push(hit.digest_entry()),
            AuthorityTier::Normal => general.push(hit.digest_entry()),
        }
    }

    let high_section = if high.is_empty() {
        "None".to_string()
    } else {
        high.join("\n")
    };
    let general_section = general
        .iter()
        .take(GENERAL_SOURCE_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "--- HIGH AUTHORITY SOURCES ---\n{}\n\n--- GENERAL SOURCES ---\n{}",
        high_section, general_section
    );
    (text, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::http::{ResilientClient, RetryPolicy};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hit(n: usize, link: &str) -> SearchHit {
        SearchHit {
            title: format!("Title {}", n),
            link: link.to_string(),
            snippet: format!("Snippet {}", n),
        }
    }

    fn retriever(server: &MockServer, api_key: Option<&str>) -> WebRetriever {
        let http = ResilientClient::new(Duration::from_secs(5), RetryPolicy::none()).unwrap();
        let config = SearchConfig {
            base_url: format!("{}/search", server.uri()),
            ..Default::default()
        };
        WebRetriever::new(SearchProvider::new(http, &config, api_key.map(String::from)))
    }

    #[test]
    fn test_twelve_results_two_high_authority() {
        let mut hits = Vec::new();
        for n in 0..12 {
            let link = match n {
                4 => "https://www.energy.gov/solar".to_string(),
                9 => "https://www.reuters.com/markets".to_string(),
                _ => format!("https://site{}.example.com", n),
            };
            hits.push(hit(n, &link));
        }

        let (text, links) = render_web_digest(&hits);

        assert_eq!(links.len(), 12);
        assert_eq!(links[4], "https://www.energy.gov/solar");

        let (high, general) = text.split_once("--- GENERAL SOURCES ---").unwrap();
        assert!(high.contains("Title 4"));
        assert!(high.contains("Title 9"));
        assert_eq!(high.matches("Source:").count(), 2);

        assert_eq!(general.matches("Source:").count(), 3);
        assert!(general.contains("Title 0"));
        assert!(general.contains("Title 1"));
        assert!(general.contains("Title 2"));
        assert!(!general.contains("Title 3"));
        assert!(!general.contains("Title 4"));
    }

    #[test]
    fn test_no_high_authority_renders_none() {
        let hits = vec![hit(0, "https://example.com")];
        let (text, _) = render_web_digest(&hits);
        assert!(text.starts_with("--- HIGH AUTHORITY SOURCES ---\nNone\n\n--- GENERAL SOURCES ---\n"));
    }

    #[test]
    fn test_empty_results() {
        let (text, links) = render_web_digest(&[]);
        assert_eq!(
            text,
            "--- HIGH AUTHORITY SOURCES ---\nNone\n\n--- GENERAL SOURCES ---\n"
        );
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_returns_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let digest = retriever(&server, None).search("solar").await;
        assert!(digest.text.contains("missing"));
        assert!(digest.links.is_empty());
        assert_eq!(digest.failure, Some(RetrievalFailure::MissingCredential));
    }

    #[tokio::test]
    async fn test_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "Quota exceeded"})),
            )
            .mount(&server)
            .await;

        let digest = retriever(&server, Some("k")).search("solar").await;
        assert_eq!(digest.text, "SerpApi Error: Quota exceeded");
        assert!(digest.links.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let digest = retriever(&server, Some("k")).search("solar").await;
        assert!(digest.text.starts_with("Web Search Failed: "));
        assert!(matches!(digest.failure, Some(RetrievalFailure::Transport(_))));
    }
}
