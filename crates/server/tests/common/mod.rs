//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! whose search and completion providers point at a local mock server, so
//! tests run without external infrastructure.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use briefwright_core::{research::PdfParser, Config, ResilientClient, RetryPolicy};
use briefwright_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use briefwright_core::testing::fixtures;

/// Test fixture with a mock search and completion provider.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.get("/api/v1/health").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock provider serving `/search`, `/v1/chat/completions` and documents
    pub server: MockServer,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture without configured default keys.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let server = MockServer::start().await;

        let mut config = Config::default();
        config.search.base_url = format!("{}/search", server.uri());
        config.search.api_key = test_config.search_api_key;
        config.completion.api_base = format!("{}/v1", server.uri());
        config.completion.api_key = test_config.completion_api_key;
        config.http.backoff_ms = 5;

        let http = ResilientClient::new(
            Duration::from_secs(5),
            RetryPolicy::new(1, Duration::from_millis(5)),
        )
        .expect("Failed to build client");

        let state = Arc::new(AppState::with_parts(config, http, Arc::new(PdfParser)));
        let router = create_router(state);

        Self { router, server }
    }

    /// Absolute URL on the mock server.
    pub fn url(&self, suffix: &str) -> String {
        format!("{}{}", self.server.uri(), suffix)
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Default keys placed in the fixture's configuration.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    pub search_api_key: Option<String>,
    pub completion_api_key: Option<String>,
}

impl TestConfig {
    /// Both providers configured server-side.
    pub fn with_keys() -> Self {
        Self {
            search_api_key: Some("serp-configured".to_string()),
            completion_api_key: Some("sk-configured".to_string()),
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
