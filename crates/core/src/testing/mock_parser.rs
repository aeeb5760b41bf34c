//! Mock document parser for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::research::{DocumentError, DocumentParser, PageText};

/// Maps exact byte payloads to canned page text.
///
/// Unknown payloads fail as malformed documents, which lets tests serve
/// arbitrary bytes from a mock host to simulate unparseable PDFs.
#[derive(Debug, Default)]
pub struct MockDocumentParser {
    documents: HashMap<Vec<u8>, PageText>,
    calls: AtomicUsize,
}

impl MockDocumentParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, bytes: &[u8], page_count: usize, text: &str) -> Self {
        self.documents.insert(
            bytes.to_vec(),
            PageText {
                page_count,
                text: text.to_string(),
            },
        );
        self
    }

    /// Number of extract calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentParser for MockDocumentParser {
    fn extract(&self, bytes: &[u8], _max_pages: usize) -> Result<PageText, DocumentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(bytes)
            .cloned()
            .ok_or_else(|| DocumentError::Malformed("unrecognised test document".to_string()))
    }
}
