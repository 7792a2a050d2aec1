//! Error types for the lingodoc library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`LingodocError`] — **Fatal for the request**: the caller supplied no
//!   usable content, the content could not be decoded, or the downstream
//!   completion failed. Returned as `Err(LingodocError)` from the request
//!   path and mapped onto an HTTP status and a stable [`ErrorKind`].
//!
//! * [`ExtractError`] — **Non-fatal**: a single page (or the whole container)
//!   could not be read, but extraction of the remaining pages continues.
//!   Stored inside [`crate::extract::PageText`] so callers can distinguish
//!   "legitimately empty page" from "extraction failed" without parsing
//!   strings.
//!
//! The separation lets the HTTP layer keep the original contract (emptiness
//! signals an unsupported or unreadable upload) while the diagnostic path
//! can still report exactly which pages failed and why.

use thiserror::Error;

/// All fatal errors returned by the lingodoc library.
///
/// Page-level failures use [`ExtractError`] and are stored on
/// [`crate::extract::PageText`] rather than propagated here.
#[derive(Debug, Error)]
pub enum LingodocError {
    // ── Client input errors ───────────────────────────────────────────────
    /// Neither a file part nor a text field was supplied.
    #[error("No content received")]
    NoContent,

    /// The extracted or supplied content is empty or whitespace-only.
    #[error("Empty or unsupported file.")]
    EmptyContent,

    /// A `.txt` upload was not valid UTF-8.
    #[error("File '{filename}' is not valid UTF-8: {detail}")]
    InvalidEncoding { filename: String, detail: String },

    /// `/debug-pdf` was called with a non-PDF filename.
    #[error("File '{filename}' is not a PDF; the diagnostic endpoint accepts .pdf only")]
    NotAPdf { filename: String },

    /// The multipart body could not be read.
    #[error("Malformed multipart request: {0}")]
    BadMultipart(String),

    // ── Completion errors ─────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The completion API failed after all applicable retries.
    #[error("Completion failed: {detail}")]
    Completion { detail: String, transient: bool },

    /// A completion call exceeded the configured timeout.
    #[error("Completion timed out after {secs}s")]
    CompletionTimeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LingodocError {
    /// Stable machine-readable category for the wire format.
    ///
    /// The original service exposed only an `error` string; `kind` is
    /// additive so existing callers keep working.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LingodocError::NoContent => ErrorKind::NoContent,
            LingodocError::EmptyContent => ErrorKind::EmptyContent,
            LingodocError::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            LingodocError::NotAPdf { .. } => ErrorKind::NotAPdf,
            LingodocError::BadMultipart(_) => ErrorKind::BadRequest,
            LingodocError::ProviderNotConfigured { .. } => ErrorKind::ProviderNotConfigured,
            LingodocError::Completion { .. } => ErrorKind::CompletionFailed,
            LingodocError::CompletionTimeout { .. } => ErrorKind::CompletionTimeout,
            LingodocError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            LingodocError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Stable error categories carried in every JSON error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoContent,
    EmptyContent,
    InvalidEncoding,
    NotAPdf,
    BadRequest,
    ProviderNotConfigured,
    CompletionFailed,
    CompletionTimeout,
    InvalidConfig,
    Internal,
}

/// A non-fatal extraction failure.
///
/// Stored alongside [`crate::extract::PageText`] when a page (or the whole
/// container) fails. Extraction of the remaining pages continues, so the
/// caller always receives a result — possibly empty, never a crash.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractError {
    /// One page could not be read; other pages are unaffected.
    #[error("page {page}: text extraction failed: {detail}")]
    Page { page: usize, detail: String },

    /// The container itself could not be opened or parsed.
    #[error("container could not be read: {detail}")]
    Container { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_content_message_matches_wire_contract() {
        assert_eq!(LingodocError::NoContent.to_string(), "No content received");
    }

    #[test]
    fn empty_content_message_matches_wire_contract() {
        assert_eq!(
            LingodocError::EmptyContent.to_string(),
            "Empty or unsupported file."
        );
    }

    #[test]
    fn kind_serialises_snake_case() {
        let s = serde_json::to_string(&ErrorKind::EmptyContent).unwrap();
        assert_eq!(s, "\"empty_content\"");
        let s = serde_json::to_string(&ErrorKind::CompletionFailed).unwrap();
        assert_eq!(s, "\"completion_failed\"");
    }

    #[test]
    fn page_error_display() {
        let e = ExtractError::Page {
            page: 3,
            detail: "bad content stream".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bad content stream"));
    }

    #[test]
    fn completion_kinds() {
        let e = LingodocError::Completion {
            detail: "quota".into(),
            transient: false,
        };
        assert_eq!(e.kind(), ErrorKind::CompletionFailed);
        let e = LingodocError::CompletionTimeout { secs: 60 };
        assert_eq!(e.kind(), ErrorKind::CompletionTimeout);
    }
}
