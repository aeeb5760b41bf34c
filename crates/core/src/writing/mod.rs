//! Completion-backed writing stages.
//!
//! - [`Synthesizer`] condenses source digests into a research brief
//! - [`Strategist`] chooses the tone and angle of a pitch
//! - [`PitchWriter`] writes the pitch in the user's voice

mod strategist;
mod synthesizer;
mod writer;

pub use strategist::{Strategist, Strategy, StrategyError, STRATEGY_TEMPERATURE};
pub use synthesizer::{Synthesizer, SYNTHESIS_TEMPERATURE};
pub use writer::{mask_country, PitchInput, PitchWriter, WRITER_TEMPERATURE};
