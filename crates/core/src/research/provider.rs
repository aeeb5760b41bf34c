//! Search provider client (SerpApi-compatible).

use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::types::{PaperCandidate, PaperResource, SearchHit};
use crate::config::{HttpConfig, SearchConfig};
use crate::http::{FetchError, FetchRequest, ResilientClient};
use crate::metrics::observe_external;

pub const WEB_ENGINE: &str = "google";
pub const SCHOLAR_ENGINE: &str = "google_scholar";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("search API key is missing")]
    MissingCredential,

    /// The provider reported an error in its response body.
    #[error("{0}")]
    Reported(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Headers that make requests look like an ordinary browser visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub referer: String,
}

impl BrowserProfile {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            referer: config.referer.clone(),
        }
    }

    pub fn apply(&self, request: FetchRequest) -> FetchRequest {
        request
            .with_header("User-Agent", self.user_agent.as_str())
            .with_header("Accept", ACCEPT_HTML)
            .with_header("Referer", self.referer.as_str())
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct WebResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScholarResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<ScholarResult>,
}

#[derive(Debug, Deserialize)]
struct ScholarResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    resources: Vec<ScholarResource>,
}

#[derive(Debug, Deserialize)]
struct ScholarResource {
    #[serde(default)]
    file_format: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Client for web and scholarly search.
///
/// The API key is injected by the caller; an empty key counts as missing.
#[derive(Debug, Clone)]
pub struct SearchProvider {
    http: ResilientClient,
    base_url: String,
    api_key: Option<String>,
    num_results: u32,
    language: String,
}

impl SearchProvider {
    pub fn new(http: ResilientClient, config: &SearchConfig, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            num_results: config.num_results,
            language: config.language.clone(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Organic web results in provider order. Results without a link are dropped.
    pub async fn search_web(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let request = FetchRequest::get(&self.base_url)
            .with_query("engine", WEB_ENGINE)
            .with_query("q", query)
            .with_query("api_key", api_key)
            .with_query("num", self.num_results);

        let body: WebResponse = self.send(&request, "web").await?;
        if let Some(error) = body.error {
            return Err(ProviderError::Reported(error));
        }

        let hits: Vec<SearchHit> = body
            .organic_results
            .into_iter()
            .filter_map(|r| {
                Some(SearchHit {
                    link: r.link?,
                    title: r.title.unwrap_or_default(),
                    snippet: r.snippet.unwrap_or_default(),
                })
            })
            .collect();

        debug!(query, results = hits.len(), "Web search returned");
        Ok(hits)
    }

    /// Scholarly results published from `start_year` onwards, in provider order.
    pub async fn search_scholar(
        &self,
        query: &str,
        start_year: i32,
        browser: &BrowserProfile,
    ) -> Result<Vec<PaperCandidate>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let request = FetchRequest::get(&self.base_url)
            .with_query("engine", SCHOLAR_ENGINE)
            .with_query("q", query)
            .with_query("api_key", api_key)
            .with_query("as_ylo", start_year)
            .with_query("hl", self.language.as_str())
            .with_query("num", self.num_results);
        let request = browser.apply(request);

        let body: ScholarResponse = self.send(&request, "scholar").await?;
        if let Some(error) = body.error {
            return Err(ProviderError::Reported(error));
        }

        let candidates: Vec<PaperCandidate> = body
            .organic_results
            .into_iter()
            .map(|r| PaperCandidate {
                title: r.title.unwrap_or_else(|| "Untitled".to_string()),
                resources: r
                    .resources
                    .into_iter()
                    .filter_map(|res| {
                        Some(PaperResource {
                            format: res.file_format?,
                            url: res.link?,
                        })
                    })
                    .collect(),
            })
            .collect();

        debug!(query, start_year, results = candidates.len(), "Scholar search returned");
        Ok(candidates)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: &FetchRequest,
        operation: &str,
    ) -> Result<T, ProviderError> {
        let start = Instant::now();
        let result = self.http.fetch(request).await;
        observe_external(
            "search",
            operation,
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match result {
            Ok(response) => Ok(response.json()?),
            Err(e) => {
                // Providers explain rejected keys and quotas in a JSON body.
                if let Some(reported) = e
                    .body()
                    .and_then(|b| serde_json::from_str::<ErrorBody>(b).ok())
                {
                    return Err(ProviderError::Reported(reported.error));
                }
                Err(e.into())
            }
        }
    }
}
