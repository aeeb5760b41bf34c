//! End-to-end runs.
//!
//! [`ResearchPipeline`] produces a brief with provenance; [`PitchWorkflow`]
//! wraps it with strategy analysis beforehand and pitch writing afterwards.
//! Stages run sequentially within a run; concurrent runs share only the
//! read-only configuration and the HTTP connection pool.

mod pitch;
mod research;
mod types;

pub use pitch::PitchWorkflow;
pub use research::ResearchPipeline;
pub use types::*;
