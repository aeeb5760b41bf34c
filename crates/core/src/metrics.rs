//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Outbound HTTP (retries)
//! - Research stages (web, scholar, synthesis outcomes)
//! - Document scanning (papers extracted, candidates skipped)
//! - External services (search provider, completion service, document hosts)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// HTTP
// =============================================================================

/// Retry attempts total by reason.
pub static FETCH_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("briefwright_fetch_retries_total", "Total HTTP retry attempts"),
        &["reason"], // "status", "transport"
    )
    .unwrap()
});

// =============================================================================
// Research stages
// =============================================================================

/// Stage outcomes total.
pub static STAGE_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "briefwright_stage_outcomes_total",
            "Research stage outcomes",
        ),
        &["stage", "result"], // stage: "web", "scholar", "synthesis", "strategy", "writer"
    )
    .unwrap()
});

/// Pipeline run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "briefwright_run_duration_seconds",
            "Duration of full pipeline runs",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0]),
        &["pipeline"], // "research", "pitch"
    )
    .unwrap()
});

// =============================================================================
// Document scanning
// =============================================================================

/// Papers successfully extracted.
pub static PAPERS_EXTRACTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "briefwright_papers_extracted_total",
        "Total papers with extracted PDF text",
    )
    .unwrap()
});

/// Scholar candidates that did not yield a paper, by reason.
pub static CANDIDATES_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "briefwright_candidates_skipped_total",
            "Scholar candidates skipped",
        ),
        &["reason"], // "no_pdf", "download", "parse", "empty"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "briefwright_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "briefwright_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("briefwright_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one external call's duration and outcome.
pub fn observe_external(service: &str, operation: &str, seconds: f64, success: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(seconds);
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, if success { "success" } else { "error" }])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FETCH_RETRIES.clone()),
        Box::new(STAGE_OUTCOMES.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(PAPERS_EXTRACTED.clone()),
        Box::new(CANDIDATES_SKIPPED.clone()),
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
