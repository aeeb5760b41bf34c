//! PDF text extraction.

use thiserror::Error;
use tracing::debug;

/// Longest excerpt kept from one paper, in characters.
pub const MAX_EXCERPT_CHARS: usize = 2500;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),
}

/// Text pulled from the leading pages of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    /// Total pages in the document, not just those read.
    pub page_count: usize,
    pub text: String,
}

/// Turns downloaded bytes into page text.
pub trait DocumentParser: Send + Sync {
    /// Read the text of at most `max_pages` leading pages.
    fn extract(&self, bytes: &[u8], max_pages: usize) -> Result<PageText, DocumentError>;
}

/// [`DocumentParser`] backed by lopdf.
///
/// Extraction order and completeness follow lopdf's content-stream decoding;
/// a page that fails to decode contributes no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl DocumentParser for PdfParser {
    fn extract(&self, bytes: &[u8], max_pages: usize) -> Result<PageText, DocumentError> {
        let document =
            lopdf::Document::load_mem(bytes).map_err(|e| DocumentError::Malformed(e.to_string()))?;

        let pages = document.get_pages();
        let mut text = String::new();
        for page_number in pages.keys().take(max_pages) {
            match document.extract_text(&[*page_number]) {
                Ok(page) => text.push_str(&page),
                Err(e) => debug!(page = page_number, error = %e, "Skipping unreadable page"),
            }
        }

        Ok(PageText {
            page_count: pages.len(),
            text,
        })
    }
}

/// Collapse line breaks to spaces and cap at [`MAX_EXCERPT_CHARS`].
pub fn clean_excerpt(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .chars()
        .take(MAX_EXCERPT_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pdf_with_pages;

    #[test]
    fn test_clean_excerpt_truncates_long_text() {
        let raw = "a".repeat(10_000);
        let cleaned = clean_excerpt(&raw);
        assert_eq!(cleaned.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_clean_excerpt_collapses_newlines() {
        assert_eq!(clean_excerpt("one\ntwo\r\nthree"), "one two three");
        assert_eq!(clean_excerpt("a\n\nb"), "a  b");
    }

    #[test]
    fn test_clean_excerpt_is_char_boundary_safe() {
        let raw = "é".repeat(3000);
        let cleaned = clean_excerpt(&raw);
        assert_eq!(cleaned.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_pdf_parser_reads_only_leading_pages() {
        let bytes = pdf_with_pages(&["First page", "Second page", "Third page"]);
        let page_text = PdfParser.extract(&bytes, 2).unwrap();
        assert_eq!(page_text.page_count, 3);
        assert!(page_text.text.contains("First page"));
        assert!(page_text.text.contains("Second page"));
        assert!(!page_text.text.contains("Third page"));
    }

    #[test]
    fn test_pdf_parser_short_document() {
        let bytes = pdf_with_pages(&["Only page"]);
        let page_text = PdfParser.extract(&bytes, 2).unwrap();
        assert_eq!(page_text.page_count, 1);
        assert!(page_text.text.contains("Only page"));
    }

    #[test]
    fn test_pdf_parser_rejects_garbage() {
        let result = PdfParser.extract(b"<html>not a pdf</html>", 2);
        assert!(matches!(result, Err(DocumentError::Malformed(_))));
    }
}
