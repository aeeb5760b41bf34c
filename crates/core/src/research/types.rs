//! Types shared by the research retrievers.

use serde::{Deserialize, Serialize};

/// Returned in place of a digest when no search credential is available.
pub const MISSING_SEARCH_KEY: &str = "ERROR: SERP API Key is missing.";

/// Scholar digest text when no candidate yielded readable PDF content.
pub const NO_PDF_CONTENT: &str = "No accessible PDF content found.";

/// Topic to research.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchQuery {
    /// Free-text research topic.
    pub text: String,
    /// Lower bound on publication year for scholarly sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
}

impl ResearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_year: None,
        }
    }

    pub fn with_start_year(mut self, year: i32) -> Self {
        self.start_year = Some(year);
        self
    }
}

/// One organic web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    /// Entry as it appears in the web digest.
    pub fn digest_entry(&self) -> String {
        format!(
            "Source: {} ({})\nFact: {}\n",
            self.title, self.link, self.snippet
        )
    }
}

/// A downloadable resource attached to a scholarly result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperResource {
    /// Format tag as reported by the provider (e.g. "PDF", "HTML").
    pub format: String,
    pub url: String,
}

/// A scholarly search result before any download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperCandidate {
    pub title: String,
    #[serde(default)]
    pub resources: Vec<PaperResource>,
}

impl PaperCandidate {
    /// URL of the first resource tagged `PDF`.
    pub fn pdf_url(&self) -> Option<&str> {
        self.resources
            .iter()
            .find(|r| r.format == "PDF")
            .map(|r| r.url.as_str())
    }
}

/// A paper whose PDF was downloaded and parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPaper {
    pub title: String,
    /// Year the search was filtered from, not the publication year.
    pub year_floor: i32,
    /// Cleaned excerpt, at most 2500 characters.
    pub text: String,
    pub source_url: String,
}

impl ExtractedPaper {
    pub fn digest_entry(&self) -> String {
        format!(
            "Paper: {} ({}+)\nContent: {}...\n",
            self.title, self.year_floor, self.text
        )
    }

    pub fn provenance_entry(&self) -> String {
        format!("{}: {}", self.title, self.source_url)
    }
}

/// Why a retriever produced a degraded digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RetrievalFailure {
    MissingCredential,
    /// The provider answered with an error message.
    Provider(String),
    /// The request failed or the response could not be decoded.
    Transport(String),
}

/// Text and link log produced by one retriever.
///
/// Retrievers never return errors: failures are folded into `text` as a
/// human-readable message and tagged in `failure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDigest {
    pub text: String,
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<RetrievalFailure>,
    /// Candidate tallies, set by scholar scans that reached the PDFs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan: Option<ScanReport>,
}

impl SourceDigest {
    pub fn ok(text: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            text: text.into(),
            links,
            failure: None,
            scan: None,
        }
    }

    pub fn failed(text: impl Into<String>, failure: RetrievalFailure) -> Self {
        Self {
            text: text.into(),
            links: Vec::new(),
            failure: Some(failure),
            scan: None,
        }
    }

    pub fn missing_credential() -> Self {
        Self::failed(MISSING_SEARCH_KEY, RetrievalFailure::MissingCredential)
    }

    pub fn with_scan(mut self, report: ScanReport) -> Self {
        self.scan = Some(report);
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Per-candidate tallies from one scholar scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Candidates with a PDF resource that were downloaded.
    pub attempted: u32,
    /// Candidates without a PDF resource.
    pub skipped_no_pdf: u32,
    /// Attempted candidates that did not yield text.
    pub failed: u32,
    pub extracted: u32,
}
