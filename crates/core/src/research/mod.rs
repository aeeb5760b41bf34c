//! Source retrieval for research briefs.
//!
//! Two retrievers feed the pipeline:
//! - [`WebRetriever`] runs a web search and tiers results by [`classify`]
//! - [`ScholarRetriever`] runs a scholarly search and reads the opening pages
//!   of up to [`MAX_PAPERS`] PDFs
//!
//! Neither returns an error. Missing credentials, provider errors and
//! transport failures are folded into the returned [`SourceDigest`].

mod authority;
mod document;
mod provider;
mod scholar;
mod types;
mod web;

pub use authority::{classify, AuthorityTier, HIGH_AUTHORITY_DOMAINS};
pub use document::{clean_excerpt, DocumentError, DocumentParser, PageText, PdfParser, MAX_EXCERPT_CHARS};
pub use provider::{BrowserProfile, ProviderError, SearchProvider, SCHOLAR_ENGINE, WEB_ENGINE};
pub use scholar::{
    default_start_year, render_scholar_digest, CandidateError, PaperAccumulator, ScanOutcome,
    ScholarRetriever, MAX_PAGES, MAX_PAPERS,
};
pub use types::*;
pub use web::{render_web_digest, WebRetriever, GENERAL_SOURCE_LIMIT};
