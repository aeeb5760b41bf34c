pub mod config;
pub mod http;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod research;
pub mod testing;
pub mod writing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use http::{FetchError, FetchRequest, FetchResponse, ResilientClient, RetryPolicy};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAiClient};
pub use pipeline::{
    Credentials, PitchReport, PitchRequest, PitchWorkflow, ProvenanceLog, ResearchOutcome,
    ResearchPipeline,
};
pub use research::{
    classify, AuthorityTier, DocumentParser, PdfParser, ResearchQuery, SourceDigest,
};
pub use writing::{PitchWriter, Strategist, Strategy, Synthesizer};
