//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the completion service and the PDF parser so the
//! pipeline can be exercised against `wiremock` hosts without real
//! credentials.
//!
//! # Example
//!
//! ```rust,ignore
//! use briefwright_core::testing::{fixtures, MockDocumentParser, MockLlmClient};
//!
//! let parser = MockDocumentParser::new().with_document(b"pdf-1", 3, "findings");
//! let llm = MockLlmClient::new().with_reply("Tone: Authoritative\nAngle: Hard stats");
//! let pdf = fixtures::pdf_with_pages(&["Intro", "Method"]);
//! ```

mod mock_llm;
mod mock_parser;

pub use mock_llm::{MockLlmClient, RecordedCompletion};
pub use mock_parser::MockDocumentParser;

pub use fixtures::pdf_with_pages;

/// Test fixtures and helper functions.
pub mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a minimal PDF with one text line per page.
    pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12i64.into()]),
                    Operation::new("Td", vec![72i64.into(), 720i64.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap_or_default(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// Search provider body with organic web results `(title, link, snippet)`.
    pub fn web_results(results: &[(&str, &str, &str)]) -> serde_json::Value {
        serde_json::json!({
            "organic_results": results
                .iter()
                .map(|(title, link, snippet)| serde_json::json!({
                    "title": title,
                    "link": link,
                    "snippet": snippet,
                }))
                .collect::<Vec<_>>()
        })
    }

    /// Search provider body with scholar results `(title, pdf_url)`.
    pub fn scholar_results(results: &[(&str, Option<&str>)]) -> serde_json::Value {
        serde_json::json!({
            "organic_results": results
                .iter()
                .map(|(title, pdf)| match pdf {
                    Some(url) => serde_json::json!({
                        "title": title,
                        "resources": [{"title": "pdf", "file_format": "PDF", "link": url}],
                    }),
                    None => serde_json::json!({"title": title}),
                })
                .collect::<Vec<_>>()
        })
    }

    /// Chat completions body with a single choice.
    pub fn chat_completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20}
        })
    }
}
