//! Text extraction from uploaded documents.
//!
//! Each submodule implements exactly one container format. Keeping formats
//! separate makes each independently testable and lets us swap a parsing
//! backend without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! filename ──▶ sniff ──▶ extract ──▶ ExtractedDocument
//! + bytes    (suffix)   (lopdf /     (ordered pages,
//!                        zip+xml /    typed failures)
//!                        utf-8)
//! ```
//!
//! Extraction never aborts a request over a bad page: a page that cannot be
//! read contributes empty text plus a typed [`ExtractError`] on its entry,
//! so callers can tell "legitimately empty" from "failed" without parsing
//! error strings out of the content. An unsupported suffix yields an empty
//! document — emptiness is the unsupported-format signal the HTTP layer
//! turns into a 422.

pub mod docx;
pub mod pdf;
pub mod text;

use crate::error::{ExtractError, LingodocError};
use tracing::debug;

/// Extraction strategy, selected from the uploaded filename only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
    Unsupported,
}

impl DocumentFormat {
    /// Select a strategy by case-insensitive suffix match.
    ///
    /// Uploaded filenames arrive in whatever case the client produced
    /// (`Report.PDF`, `notes.Txt`), so the comparison is normalised.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if lower.ends_with(".docx") {
            DocumentFormat::Docx
        } else if lower.ends_with(".txt") {
            DocumentFormat::PlainText
        } else {
            DocumentFormat::Unsupported
        }
    }
}

/// One page's (or paragraph block's) extraction outcome.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-indexed page number in source order.
    pub page_num: usize,
    /// Extracted text; empty when the page had none or extraction failed.
    pub text: String,
    /// Set when this page could not be read. `None` + empty `text` means
    /// the page genuinely had no extractable text.
    pub error: Option<ExtractError>,
}

impl PageText {
    pub fn ok(page_num: usize, text: String) -> Self {
        Self {
            page_num,
            text,
            error: None,
        }
    }

    pub fn failed(page_num: usize, error: ExtractError) -> Self {
        Self {
            page_num,
            text: String::new(),
            error: Some(error),
        }
    }
}

/// The full extraction result: ordered pages with per-page outcomes.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub pages: Vec<PageText>,
}

impl ExtractedDocument {
    /// An empty document — produced for unsupported formats.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a single flat text value (plain-text uploads, DOCX output).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            pages: vec![PageText::ok(1, text.into())],
        }
    }

    /// Concatenate all page texts in source order, separated by newlines.
    ///
    /// Failed pages contribute their (empty) text like any other page; use
    /// [`ExtractedDocument::failures`] to see what went wrong.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Extraction failures in page order.
    pub fn failures(&self) -> impl Iterator<Item = &ExtractError> {
        self.pages.iter().filter_map(|p| p.error.as_ref())
    }

    /// True when the concatenated text is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// Extract text from uploaded bytes, dispatching on the filename suffix.
///
/// PDF and DOCX parsing are CPU-bound and run under `spawn_blocking` so
/// they never stall the request executor. The only fatal error here is a
/// non-UTF-8 plain-text upload — a client error, not a crash.
pub async fn extract_document(
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ExtractedDocument, LingodocError> {
    match DocumentFormat::from_filename(filename) {
        DocumentFormat::Pdf => tokio::task::spawn_blocking(move || pdf::extract(&bytes))
            .await
            .map_err(|e| LingodocError::Internal(format!("extraction task panicked: {e}"))),
        DocumentFormat::Docx => tokio::task::spawn_blocking(move || docx::extract(&bytes))
            .await
            .map_err(|e| LingodocError::Internal(format!("extraction task panicked: {e}"))),
        DocumentFormat::PlainText => text::extract(bytes, filename),
        DocumentFormat::Unsupported => {
            debug!(filename, "unsupported suffix; returning empty extraction");
            Ok(ExtractedDocument::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffer_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_filename("Report.PDF"),
            DocumentFormat::from_filename("report.pdf")
        );
        assert_eq!(
            DocumentFormat::from_filename("NOTES.TXT"),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::from_filename("Letter.DocX"),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn sniffer_rejects_unknown_suffixes() {
        assert_eq!(
            DocumentFormat::from_filename("image.png"),
            DocumentFormat::Unsupported
        );
        assert_eq!(
            DocumentFormat::from_filename("no_extension"),
            DocumentFormat::Unsupported
        );
        assert_eq!(DocumentFormat::from_filename(""), DocumentFormat::Unsupported);
    }

    #[tokio::test]
    async fn unsupported_format_yields_empty_document() {
        let doc = extract_document("archive.tar.gz", vec![1, 2, 3])
            .await
            .unwrap();
        assert!(doc.pages.is_empty());
        assert!(doc.is_blank());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn text_joins_pages_with_newlines() {
        let doc = ExtractedDocument {
            pages: vec![
                PageText::ok(1, "one".into()),
                PageText::ok(2, String::new()),
                PageText::ok(3, "three".into()),
            ],
        };
        assert_eq!(doc.text(), "one\n\nthree");
    }

    #[test]
    fn failed_page_contributes_empty_text_and_a_failure() {
        let doc = ExtractedDocument {
            pages: vec![
                PageText::ok(1, "ok".into()),
                PageText::failed(
                    2,
                    crate::error::ExtractError::Page {
                        page: 2,
                        detail: "bad stream".into(),
                    },
                ),
            ],
        };
        assert_eq!(doc.text(), "ok\n");
        assert_eq!(doc.failures().count(), 1);
        assert!(!doc.is_blank());
    }
}
