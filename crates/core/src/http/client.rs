//! Retrying HTTP client built on reqwest.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use crate::config::Config;
use crate::metrics::FETCH_RETRIES;

/// Errors surfaced by [`ResilientClient::fetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// A transient server status persisted through the whole retry budget.
    #[error("{url} still returned HTTP {status} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        status: u16,
        attempts: u32,
    },

    /// A non-retryable, non-success status (4xx and friends).
    #[error("HTTP {status}: {}", preview(.body))]
    Status { status: u16, body: String },

    /// Network-level failure (connect, timeout, reset) after the retry budget.
    #[error("request to {url} failed: {message}")]
    Transport {
        url: String,
        message: String,
        timed_out: bool,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl FetchError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RetriesExhausted { status, .. } | FetchError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Raw response body for status errors (providers often explain themselves there).
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

/// A single outbound request, rebuilt for every attempt.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub bearer_token: Option<String>,
    /// Overrides the client-wide timeout for this request.
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            json: None,
            bearer_token: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::POST, url);
        request.json = Some(body);
        request
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client with bounded automatic retry.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    client: Client,
    policy: RetryPolicy,
}

impl ResilientClient {
    /// Create a client whose requests time out after `default_timeout`
    /// unless the request sets its own.
    pub fn new(default_timeout: Duration, policy: RetryPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(default_timeout)
            .build()
            .map_err(|e| FetchError::Build(e.to_string()))?;

        Ok(Self { client, policy })
    }

    /// Client with the search timeout as default and the configured retry policy.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            Duration::from_secs(config.search.timeout_secs as u64),
            RetryPolicy::from_config(&config.http),
        )
    }

    /// Send `request`, retrying transient failures within the policy budget.
    ///
    /// Returns the response only for 2xx statuses.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut retry: u32 = 0;

        loop {
            let attempt = retry + 1;
            let outcome = self.send_once(request).await;

            let (reason, error) = match outcome {
                Ok(response) if (200..300).contains(&response.status) => {
                    debug!(
                        url = %request.url,
                        status = response.status,
                        attempt,
                        bytes = response.body.len(),
                        "Request succeeded"
                    );
                    return Ok(response);
                }
                Ok(response) if self.policy.should_retry_status(response.status) => (
                    "status",
                    FetchError::RetriesExhausted {
                        url: request.url.clone(),
                        status: response.status,
                        attempts: attempt,
                    },
                ),
                Ok(response) => {
                    return Err(FetchError::Status {
                        status: response.status,
                        body: response.text(),
                    })
                }
                Err(e @ FetchError::Transport { .. }) => ("transport", e),
                Err(e) => return Err(e),
            };

            if attempt >= self.policy.max_attempts() {
                warn!(url = %request.url, attempts = attempt, error = %error, "Retry budget exhausted");
                return Err(error);
            }

            retry += 1;
            let delay = self.policy.backoff(retry);
            FETCH_RETRIES.with_label_values(&[reason]).inc();
            warn!(
                url = %request.url,
                attempt,
                reason,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&request.url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&request.url, e))?;

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Query strings carry API keys, so the URL is stripped from reqwest's message.
fn transport_error(url: &str, error: reqwest::Error) -> FetchError {
    let timed_out = error.is_timeout();
    FetchError::Transport {
        url: url.to_string(),
        message: error.without_url().to_string(),
        timed_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(max_retries: u32) -> ResilientClient {
        ResilientClient::new(
            Duration::from_secs(5),
            RetryPolicy::new(max_retries, Duration::from_millis(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_retries_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(3)
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(3);
        let response = client
            .fetch(&FetchRequest::get(format!("{}/flaky", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_fourth_503_exhausts_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let client = fast_client(3);
        let err = client
            .fetch(&FetchRequest::get(format!("{}/down", server.uri())))
            .await
            .unwrap_err();

        match err {
            FetchError::RetriesExhausted {
                status, attempts, ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(attempts, 4);
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(3);
        let err = client
            .fetch(&FetchRequest::get(format!("{}/missing", server.uri())))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("nope"));
    }

    #[tokio::test]
    async fn test_connection_refused_surfaces_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let client = fast_client(2);
        let err = client
            .fetch(&FetchRequest::get(format!("http://127.0.0.1:{}/x", port)))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_per_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = fast_client(0);
        let err = client
            .fetch(
                &FetchRequest::get(format!("{}/slow", server.uri()))
                    .with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();

        match err {
            FetchError::Transport { timed_out, .. } => assert!(timed_out),
            other => panic!("expected Transport, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_headers_and_bearer_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(query_param("q", "rust"))
            .and(header("x-trace", "abc"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(0);
        let response = client
            .fetch(
                &FetchRequest::post_json(
                    format!("{}/echo", server.uri()),
                    serde_json::json!({"hello": "world"}),
                )
                .with_query("q", "rust")
                .with_header("x-trace", "abc")
                .with_bearer_auth("tok"),
            )
            .await
            .unwrap();

        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["ok"], true);
    }

    #[test]
    fn test_status_error_display_is_truncated() {
        let err = FetchError::Status {
            status: 400,
            body: "x".repeat(1000),
        };
        assert!(err.to_string().len() < 220);
    }
}
