//! Inputs and outputs of the pipelines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::research::{RetrievalFailure, ScanReport};
use crate::writing::Strategy;

/// Web links shown when provenance is rendered for display.
pub const DISPLAY_WEB_LINKS: usize = 5;

/// API keys for one run.
///
/// Blank keys are treated as absent. Keys passed with a request take
/// precedence over configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub search_api_key: Option<String>,
    pub completion_api_key: Option<String>,
}

fn non_blank(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

fn is_set(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

impl Credentials {
    pub fn new(search_api_key: Option<String>, completion_api_key: Option<String>) -> Self {
        Self {
            search_api_key: non_blank(search_api_key),
            completion_api_key: non_blank(completion_api_key),
        }
    }

    /// Default keys from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.search.api_key.clone(),
            config.completion.api_key.clone(),
        )
    }

    /// Fill keys missing from `self` with those in `fallback`.
    pub fn or(self, fallback: Credentials) -> Self {
        Self::new(
            non_blank(self.search_api_key).or(fallback.search_api_key),
            non_blank(self.completion_api_key).or(fallback.completion_api_key),
        )
    }

    pub fn has_both(&self) -> bool {
        is_set(&self.search_api_key) && is_set(&self.completion_api_key)
    }
}

/// Every link gathered during a research run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceLog {
    /// Web result links in provider order.
    pub web_links: Vec<String>,
    /// `"{title}: {pdf_url}"` for each paper that was read.
    pub scholar_links: Vec<String>,
}

impl ProvenanceLog {
    /// Display block; only the first few web links are shown.
    pub fn render(&self) -> String {
        let papers = self
            .scholar_links
            .iter()
            .map(|l| format!("- {}", l))
            .collect::<Vec<_>>()
            .join("\n");
        let web = self
            .web_links
            .iter()
            .take(DISPLAY_WEB_LINKS)
            .map(|l| format!("- {}", l))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "--- SCHOLAR PAPERS ---\n{}\n\n--- WEB SOURCES ---\n{}",
            papers, web
        )
    }
}

/// Result of a research run.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub brief: String,
    pub provenance: ProvenanceLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_failure: Option<RetrievalFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholar_failure: Option<RetrievalFailure>,
    /// Per-candidate tallies when the scholar search returned candidates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholar_scan: Option<ScanReport>,
}

/// A request for a finished pitch.
#[derive(Debug, Clone, Deserialize)]
pub struct PitchRequest {
    pub query: String,
    /// Who the pitch is written as.
    pub profile: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Everything produced by one pitch run.
#[derive(Debug, Clone, Serialize)]
pub struct PitchReport {
    pub run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_brief: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProvenanceLog>,
    /// Rendered provenance, as shown to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_links: Option<String>,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_caps_web_links() {
        let log = ProvenanceLog {
            web_links: (1..=8).map(|n| format!("https://w{}.example", n)).collect(),
            scholar_links: vec!["Paper: https://p.example/a.pdf".to_string()],
        };

        let rendered = log.render();
        assert!(rendered.starts_with("--- SCHOLAR PAPERS ---\n- Paper: https://p.example/a.pdf\n\n--- WEB SOURCES ---\n"));
        assert!(rendered.contains("- https://w5.example"));
        assert!(!rendered.contains("https://w6.example"));
        assert_eq!(log.web_links.len(), 8);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            ProvenanceLog::default().render(),
            "--- SCHOLAR PAPERS ---\n\n\n--- WEB SOURCES ---\n"
        );
    }

    #[test]
    fn test_request_keys_override_config() {
        let request = Credentials::new(Some("req-serp".to_string()), Some(" ".to_string()));
        let config = Credentials::new(Some("cfg-serp".to_string()), Some("cfg-openai".to_string()));

        let merged = request.or(config);
        assert_eq!(merged.search_api_key.as_deref(), Some("req-serp"));
        assert_eq!(merged.completion_api_key.as_deref(), Some("cfg-openai"));
        assert!(merged.has_both());
    }

    #[test]
    fn test_blank_keys_are_absent() {
        let creds = Credentials::new(Some("".to_string()), None);
        assert!(creds.search_api_key.is_none());
        assert!(!creds.has_both());
    }

    #[test]
    fn test_has_both_ignores_blank_literal_keys() {
        let creds = Credentials {
            search_api_key: Some("serp".to_string()),
            completion_api_key: Some("  ".to_string()),
        };
        assert!(!creds.has_both());
    }
}
