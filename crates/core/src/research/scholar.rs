//! Academic retriever: scholarly search plus PDF download and parsing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::document::{clean_excerpt, DocumentError, DocumentParser};
use super::provider::{BrowserProfile, ProviderError, SearchProvider};
use super::types::{
    ExtractedPaper, PaperCandidate, RetrievalFailure, ScanReport, SourceDigest, NO_PDF_CONTENT,
};
use crate::http::{FetchError, FetchRequest, ResilientClient};
use crate::metrics::{CANDIDATES_SKIPPED, PAPERS_EXTRACTED, STAGE_OUTCOMES};

/// Papers kept per search.
pub const MAX_PAPERS: usize = 2;

/// Leading pages read from each PDF.
pub const MAX_PAGES: usize = 2;

/// Why a candidate with a PDF link yielded nothing.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("download failed: {0}")]
    Download(#[from] FetchError),

    #[error("download returned HTTP {0}")]
    UnexpectedStatus(u16),

    #[error(transparent)]
    Parse(#[from] DocumentError),

    #[error("document has no pages")]
    EmptyDocument,
}

impl CandidateError {
    fn reason(&self) -> &'static str {
        match self {
            CandidateError::Download(_) | CandidateError::UnexpectedStatus(_) => "download",
            CandidateError::Parse(_) => "parse",
            CandidateError::EmptyDocument => "empty",
        }
    }
}

/// Collects extracted papers up to a fixed cap.
#[derive(Debug)]
pub struct PaperAccumulator {
    papers: Vec<ExtractedPaper>,
    cap: usize,
}

impl PaperAccumulator {
    pub fn new(cap: usize) -> Self {
        Self {
            papers: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn is_full(&self) -> bool {
        self.papers.len() >= self.cap
    }

    /// Ignores the paper once the cap is reached.
    pub fn push(&mut self, paper: ExtractedPaper) {
        if !self.is_full() {
            self.papers.push(paper);
        }
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn into_papers(self) -> Vec<ExtractedPaper> {
        self.papers
    }
}

/// Result of scanning scholar candidates.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub papers: Vec<ExtractedPaper>,
    pub report: ScanReport,
}

/// Default publication floor: the previous calendar year.
pub fn default_start_year() -> i32 {
    chrono::Local::now().year() - 1
}

/// Render extracted papers into digest text and provenance entries.
pub fn render_scholar_digest(papers: &[ExtractedPaper]) -> (String, Vec<String>) {
    if papers.is_empty() {
        return (NO_PDF_CONTENT.to_string(), Vec::new());
    }

    let text = papers
        .iter()
        .map(ExtractedPaper::digest_entry)
        .collect::<Vec<_>>()
        .join("\n");
    let links = papers.iter().map(ExtractedPaper::provenance_entry).collect();
    (text, links)
}

/// Finds recent papers and reads the opening pages of their PDFs.
#[derive(Clone)]
pub struct ScholarRetriever {
    provider: SearchProvider,
    http: ResilientClient,
    parser: Arc<dyn DocumentParser>,
    browser: BrowserProfile,
    download_timeout: Duration,
}

impl ScholarRetriever {
    pub fn new(
        provider: SearchProvider,
        http: ResilientClient,
        parser: Arc<dyn DocumentParser>,
        browser: BrowserProfile,
        download_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            http,
            parser,
            browser,
            download_timeout,
        }
    }

    /// Never fails; problems come back as a degraded digest.
    pub async fn search(&self, query: &str, start_year: Option<i32>) -> SourceDigest {
        let start_year = start_year.unwrap_or_else(default_start_year);
        info!(query, start_year, "Searching scholarly sources");

        let candidates = match self
            .provider
            .search_scholar(query, start_year, &self.browser)
            .await
        {
            Ok(candidates) => candidates,
            Err(ProviderError::MissingCredential) => {
                STAGE_OUTCOMES.with_label_values(&["scholar", "degraded"]).inc();
                return SourceDigest::missing_credential();
            }
            Err(e) => {
                warn!(query, error = %e, "Scholar search failed");
                STAGE_OUTCOMES.with_label_values(&["scholar", "degraded"]).inc();
                let failure = match &e {
                    ProviderError::Reported(message) => RetrievalFailure::Provider(message.clone()),
                    other => RetrievalFailure::Transport(other.to_string()),
                };
                return SourceDigest::failed(format!("Scholar Search Failed: {}", e), failure);
            }
        };

        let outcome = self.scan_candidates(&candidates, start_year).await;
        info!(
            query,
            attempted = outcome.report.attempted,
            skipped_no_pdf = outcome.report.skipped_no_pdf,
            failed = outcome.report.failed,
            extracted = outcome.report.extracted,
            "Scholar scan finished"
        );
        STAGE_OUTCOMES.with_label_values(&["scholar", "ok"]).inc();

        let (text, links) = render_scholar_digest(&outcome.papers);
        SourceDigest::ok(text, links).with_scan(outcome.report)
    }

    /// Walk candidates in order until [`MAX_PAPERS`] have been extracted.
    ///
    /// Candidates after the cap are never downloaded.
    pub async fn scan_candidates(
        &self,
        candidates: &[PaperCandidate],
        start_year: i32,
    ) -> ScanOutcome {
        let mut accumulator = PaperAccumulator::new(MAX_PAPERS);
        let mut report = ScanReport::default();

        for candidate in candidates {
            if accumulator.is_full() {
                debug!("Paper cap reached, stopping scan");
                break;
            }

            let Some(pdf_url) = candidate.pdf_url() else {
                report.skipped_no_pdf += 1;
                CANDIDATES_SKIPPED.with_label_values(&["no_pdf"]).inc();
                continue;
            };

            report.attempted += 1;
            debug!(title = %candidate.title, url = pdf_url, "Downloading paper");

            match self.extract(candidate, pdf_url, start_year).await {
                Ok(paper) => {
                    info!(title = %paper.title, chars = paper.text.chars().count(), "Extracted paper");
                    PAPERS_EXTRACTED.inc();
                    accumulator.push(paper);
                }
                Err(e) => {
                    warn!(title = %candidate.title, url = pdf_url, error = %e, "Skipping paper");
                    report.failed += 1;
                    CANDIDATES_SKIPPED.with_label_values(&[e.reason()]).inc();
                }
            }
        }

        report.extracted = accumulator.len() as u32;
        ScanOutcome {
            papers: accumulator.into_papers(),
            report,
        }
    }

    async fn extract(
        &self,
        candidate: &PaperCandidate,
        pdf_url: &str,
        start_year: i32,
    ) -> Result<ExtractedPaper, CandidateError> {
        let request = self
            .browser
            .apply(FetchRequest::get(pdf_url))
            .with_timeout(self.download_timeout);
        let response = self.http.fetch(&request).await?;
        if response.status != 200 {
            return Err(CandidateError::UnexpectedStatus(response.status));
        }

        // PDF decoding is CPU-bound.
        let parser = Arc::clone(&self.parser);
        let body = response.body;
        let page_text = tokio::task::spawn_blocking(move || parser.extract(&body, MAX_PAGES))
            .await
            .map_err(|e| DocumentError::Extraction(e.to_string()))??;

        if page_text.page_count == 0 {
            return Err(CandidateError::EmptyDocument);
        }

        Ok(ExtractedPaper {
            title: candidate.title.clone(),
            year_floor: start_year,
            text: clean_excerpt(&page_text.text),
            source_url: pdf_url.to_string(),
        })
    }
}
