//! Diagnostic inspection of PDF uploads.
//!
//! A read-only side channel for operators: when a document translates
//! badly, the first question is whether extraction produced text or binary
//! soup. This module answers it with per-page quality metrics and a
//! before/after view of sanitization — without ever calling the completion
//! API, so it is free to run against suspect files.
//!
//! Inspection must survive malformed input. A container that cannot be
//! opened is a structured error, not a panic; a page that cannot be read
//! shows up in the report with its error string and zeroed stats.

use crate::error::LingodocError;
use crate::extract::pdf;
use crate::sanitize;
use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};

/// How many leading pages get per-page stats.
const SAMPLE_PAGES: usize = 3;

/// Per-page raw-text sample length, in characters.
const PAGE_SAMPLE_CHARS: usize = 500;

/// Sanitized-output sample length, in characters.
const SANITIZED_SAMPLE_CHARS: usize = 500;

/// Non-printable fraction above which a page is flagged as likely binary.
const BINARY_THRESHOLD: f64 = 0.10;

/// Container-level metadata pulled from the trailer's Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerMetadata {
    pub pdf_version: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
}

/// Extraction-quality stats for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDiagnostics {
    /// 1-indexed page number.
    pub page: usize,
    /// First 500 characters of the raw extracted text.
    pub sample: String,
    /// Total characters extracted from this page.
    pub chars: usize,
    pub non_ascii: usize,
    pub non_ascii_ratio: f64,
    pub non_printable: usize,
    /// Non-printable characters exceed 10% of the page's text.
    pub likely_binary: bool,
    /// Set when this page's extraction failed outright.
    pub error: Option<String>,
}

/// The full diagnostic report for one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfDiagnostics {
    pub page_count: usize,
    pub metadata: ContainerMetadata,
    /// Stats for the first three pages.
    pub pages: Vec<PageDiagnostics>,
    /// Character count of the raw concatenated text.
    pub original_chars: usize,
    /// Character count after sanitization.
    pub sanitized_chars: usize,
    pub container_signature: bool,
    pub aggressive_pass: bool,
    pub truncated: bool,
    /// First 500 characters of the sanitized text.
    pub sanitized_sample: String,
}

/// Inspect PDF bytes and report extraction quality.
///
/// Never calls the completion API. The only error is a container that
/// cannot be opened at all; everything past that point is best-effort and
/// recorded in the report rather than raised.
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfDiagnostics, LingodocError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| LingodocError::Internal(format!("failed to open PDF: {e}")))?;

    let metadata = container_metadata(&doc);
    let extracted = pdf::extract_from_doc(&doc);
    let page_count = extracted.pages.len();

    let pages = extracted
        .pages
        .iter()
        .take(SAMPLE_PAGES)
        .map(|p| page_diagnostics(p.page_num, &p.text, p.error.as_ref().map(|e| e.to_string())))
        .collect();

    let raw = extracted.text();
    let original_chars = raw.chars().count();
    let clean = sanitize::sanitize(&raw);

    Ok(PdfDiagnostics {
        page_count,
        metadata,
        pages,
        original_chars,
        sanitized_chars: clean.text.chars().count(),
        container_signature: clean.container_signature,
        aggressive_pass: clean.aggressive_pass,
        truncated: clean.truncated,
        sanitized_sample: clean.text.chars().take(SANITIZED_SAMPLE_CHARS).collect(),
    })
}

fn page_diagnostics(page: usize, text: &str, error: Option<String>) -> PageDiagnostics {
    let chars = text.chars().count();
    let non_ascii = text.chars().filter(|c| !c.is_ascii()).count();
    let non_printable = text
        .chars()
        .filter(|c| c.is_control() && !c.is_whitespace())
        .count();
    let non_printable_ratio = if chars == 0 {
        0.0
    } else {
        non_printable as f64 / chars as f64
    };

    PageDiagnostics {
        page,
        sample: text.chars().take(PAGE_SAMPLE_CHARS).collect(),
        chars,
        non_ascii,
        non_ascii_ratio: if chars == 0 {
            0.0
        } else {
            non_ascii as f64 / chars as f64
        },
        non_printable,
        likely_binary: non_printable_ratio > BINARY_THRESHOLD,
        error,
    }
}

fn container_metadata(doc: &Document) -> ContainerMetadata {
    ContainerMetadata {
        pdf_version: doc.version.clone(),
        title: info_string(doc, b"Title"),
        author: info_string(doc, b"Author"),
        producer: info_string(doc, b"Producer"),
    }
}

/// Read one string entry from the trailer's Info dictionary, following the
/// reference if there is one.
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info = match info {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let bytes = info.as_dict().ok()?.get(key).ok()?.as_str().ok()?;
    Some(String::from_utf8_lossy(bytes).into_owned())
}
