use std::sync::Arc;

use briefwright_core::{
    pipeline::{Credentials, PitchWorkflow, ResearchPipeline},
    research::{DocumentParser, PdfParser},
    Config, FetchError, ResilientClient, SanitizedConfig,
};

/// Shared application state.
///
/// Pipelines are built per request because credentials may come with the
/// request; the HTTP connection pool and parser are shared.
pub struct AppState {
    config: Config,
    http: ResilientClient,
    parser: Arc<dyn DocumentParser>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let http = ResilientClient::from_config(&config)?;
        Ok(Self::with_parts(config, http, Arc::new(PdfParser)))
    }

    /// State with an explicit client and parser (used by tests).
    pub fn with_parts(
        config: Config,
        http: ResilientClient,
        parser: Arc<dyn DocumentParser>,
    ) -> Self {
        Self {
            config,
            http,
            parser,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Request keys layered over configured defaults.
    pub fn credentials(&self, request: Credentials) -> Credentials {
        request.or(Credentials::from_config(&self.config))
    }

    pub fn research_pipeline(&self, credentials: &Credentials) -> ResearchPipeline {
        ResearchPipeline::from_config(
            &self.config,
            &self.http,
            credentials,
            Arc::clone(&self.parser),
        )
    }

    pub fn pitch_workflow(&self, credentials: &Credentials) -> PitchWorkflow {
        PitchWorkflow::from_config(
            &self.config,
            &self.http,
            credentials,
            Arc::clone(&self.parser),
        )
    }
}
