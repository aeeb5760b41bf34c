use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5002
}

/// Search provider (SerpApi-compatible) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default API key, used when a request does not bring its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Search endpoint (default: https://serpapi.com/search)
    #[serde(default = "default_search_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u32,
    /// Organic results requested per search (default: 10)
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    /// Interface language for scholar searches (default: "en")
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_url(),
            timeout_secs: default_search_timeout(),
            num_results: default_num_results(),
            language: default_language(),
        }
    }
}

fn default_search_url() -> String {
    "https://serpapi.com/search".to_string()
}

fn default_search_timeout() -> u32 {
    30
}

fn default_num_results() -> u32 {
    10
}

fn default_language() -> String {
    "en".to_string()
}

/// Completion service (OpenAI-compatible) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionConfig {
    /// Default API key, used when a request does not bring its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL (default: https://api.openai.com/v1)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model name (default: gpt-4o-mini)
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_completion_timeout() -> u32 {
    60
}

/// Outbound HTTP behaviour shared by every network-facing component.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Retries on 500/502/503/504 and transport failures (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Linear backoff step in milliseconds (default: 1000 → 1s, 2s, 3s)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Timeout for document downloads in seconds (default: 15)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u32,
    /// Browser identification sent to document hosts.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Referrer sent with scholar searches and document downloads.
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_download_timeout() -> u32 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_referer() -> String {
    "https://scholar.google.com/".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub search: SanitizedSearchConfig,
    pub completion: SanitizedCompletionConfig,
    pub http: HttpConfig,
}

/// Sanitized search config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub num_results: u32,
    pub language: String,
}

/// Sanitized completion config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCompletionConfig {
    pub api_base: String,
    pub model: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

fn key_configured(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            search: SanitizedSearchConfig {
                base_url: config.search.base_url.clone(),
                api_key_configured: key_configured(&config.search.api_key),
                timeout_secs: config.search.timeout_secs,
                num_results: config.search.num_results,
                language: config.search.language.clone(),
            },
            completion: SanitizedCompletionConfig {
                api_base: config.completion.api_base.clone(),
                model: config.completion.model.clone(),
                api_key_configured: key_configured(&config.completion.api_key),
                timeout_secs: config.completion.timeout_secs,
            },
            http: config.http.clone(),
        }
    }
}
