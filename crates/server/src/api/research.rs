//! Research and pitch API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use briefwright_core::{
    pipeline::{Credentials, PitchReport, PitchRequest, ProvenanceLog},
    research::{ResearchQuery, RetrievalFailure, ScanReport},
};

use crate::metrics::REQUESTS_REJECTED;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// Strategy text to attach to the run's trace.
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub serp_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub brief: String,
    pub provenance: ProvenanceLog,
    /// Rendered provenance, as shown to the user.
    pub source_links: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_failure: Option<RetrievalFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholar_failure: Option<RetrievalFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholar_scan: Option<ScanReport>,
}

#[derive(Debug, Deserialize)]
pub struct PitchApiRequest {
    pub query: String,
    pub profile: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub serp_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(endpoint: &str, reason: &str, message: &str) -> ApiError {
    REQUESTS_REJECTED.with_label_values(&[endpoint, reason]).inc();
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/research
///
/// Run web search, scholar search and synthesis. Missing keys degrade the
/// brief rather than failing the request.
pub async fn run_research(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let text = body.query.trim();
    if text.is_empty() {
        return Err(reject("research", "empty_query", "Query is required."));
    }

    let credentials = state.credentials(Credentials::new(body.serp_api_key, body.openai_api_key));
    let query = ResearchQuery {
        text: text.to_string(),
        start_year: body.year,
    };

    info!(query = %query.text, "Research requested");
    let outcome = state
        .research_pipeline(&credentials)
        .run(&query, body.strategy.as_deref())
        .await;

    Ok(Json(ResearchResponse {
        source_links: outcome.provenance.render(),
        brief: outcome.brief,
        provenance: outcome.provenance,
        web_failure: outcome.web_failure,
        scholar_failure: outcome.scholar_failure,
        scholar_scan: outcome.scholar_scan,
    }))
}

/// POST /api/v1/pitch
///
/// Strategy, research and writing. Both keys are required, from the request
/// or from configuration.
pub async fn run_pitch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PitchApiRequest>,
) -> Result<Json<PitchReport>, ApiError> {
    let credentials = state.credentials(Credentials::new(body.serp_api_key, body.openai_api_key));
    if !credentials.has_both() {
        return Err(reject(
            "pitch",
            "missing_credentials",
            "Both OpenAI API Key and SERP API Key are REQUIRED.",
        ));
    }
    if body.query.trim().is_empty() {
        return Err(reject("pitch", "empty_query", "Query is required."));
    }

    let request = PitchRequest {
        query: body.query.trim().to_string(),
        profile: body.profile,
        country: body.country,
        year: body.year,
    };

    info!(query = %request.query, "Pitch requested");
    let report = state.pitch_workflow(&credentials).run(&request).await;
    Ok(Json(report))
}
