//! PDF text extraction.
//!
//! Uses lopdf to walk the page tree and extract each page's text
//! independently. Page isolation is the point: a corrupt content stream on
//! page 7 must not cost the caller pages 1–6, so each page's failure is
//! captured on its own [`PageText`] entry and extraction continues.

use super::{ExtractedDocument, PageText};
use crate::error::ExtractError;
use lopdf::Document;
use tracing::{debug, warn};

/// Extract page-ordered text from PDF bytes.
///
/// Never fails: a document that cannot be opened at all yields a single
/// entry carrying [`ExtractError::Container`] and empty text, which the
/// emptiness rule downstream turns into a 422. A zero-page document yields
/// zero pages.
pub fn extract(bytes: &[u8]) -> ExtractedDocument {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("failed to open PDF container: {e}");
            return ExtractedDocument {
                pages: vec![PageText::failed(
                    1,
                    ExtractError::Container {
                        detail: e.to_string(),
                    },
                )],
            };
        }
    };

    extract_from_doc(&doc)
}

/// Extract page-ordered text from an already-parsed document.
///
/// Shared with the diagnostic inspector, which needs the parsed [`Document`]
/// for container metadata as well.
pub fn extract_from_doc(doc: &Document) -> ExtractedDocument {
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(pages = page_numbers.len(), "extracting PDF text");

    let pages = page_numbers
        .iter()
        .map(|&page_num| match doc.extract_text(&[page_num]) {
            Ok(text) => PageText::ok(page_num as usize, text),
            Err(e) => {
                warn!("page {page_num}: text extraction failed: {e}");
                PageText::failed(
                    page_num as usize,
                    ExtractError::Page {
                        page: page_num as usize,
                        detail: e.to_string(),
                    },
                )
            }
        })
        .collect();

    ExtractedDocument { pages }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a one-page PDF whose content stream draws `text`.
    pub(crate) fn pdf_with_text(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("serialize PDF");
        buf
    }

    /// Build a structurally valid PDF with an empty page tree.
    pub(crate) fn zero_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("serialize PDF");
        buf
    }

    #[test]
    fn extracts_page_text() {
        let bytes = pdf_with_text("Hello from a PDF");
        let doc = extract(&bytes);
        assert_eq!(doc.failures().count(), 0);
        assert!(doc.text().contains("Hello from a PDF"), "got: {:?}", doc.text());
    }

    #[test]
    fn zero_page_pdf_yields_empty_text() {
        let doc = extract(&zero_page_pdf());
        assert!(doc.pages.is_empty());
        assert_eq!(doc.text(), "");
        assert!(doc.is_blank());
    }

    #[test]
    fn garbage_bytes_yield_container_failure_not_panic() {
        let doc = extract(b"definitely not a pdf");
        assert!(doc.is_blank());
        assert_eq!(doc.failures().count(), 1);
        assert!(matches!(
            doc.pages[0].error,
            Some(ExtractError::Container { .. })
        ));
    }
}
