//! # lingodoc
//!
//! Summarize and translate documents (PDF, DOCX, plain text) with LLMs —
//! an HTTP service and the library underneath it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (file or text)
//!  │
//!  ├─ 1. Sniff     select an extractor from the filename suffix
//!  ├─ 2. Extract   PDF pages / DOCX paragraphs / UTF-8 text, per-page tolerant
//!  ├─ 3. Sanitize  strip leaked container syntax, cap at 50k chars
//!  ├─ 4. Complete  summary + translation via the LLM provider (retry, timeout)
//!  └─ 5. Respond   assembled markdown: ### Summary … --- … ### Translation
//! ```
//!
//! Extraction is deliberately forgiving: a corrupt page contributes empty
//! text plus a typed failure marker instead of aborting the request, and an
//! unsupported file type yields an empty result that the HTTP layer reports
//! as a 422. The sanitizer guarantees whatever reaches the model is
//! printable text within the length cap. A separate diagnostic endpoint
//! ([`inspect`]) reports per-page extraction quality without spending any
//! tokens.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lingodoc::{AppState, ProviderCompleter, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ServiceConfig::default();
//!     let provider = lingodoc::resolve_provider(&config)?;
//!     let completer = Arc::new(ProviderCompleter::new(provider, &config));
//!     let app = lingodoc::router(AppState::new(completer, config));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lingodoc` server binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lingodoc = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod inspect;
pub mod llm;
pub mod prompts;
pub mod sanitize;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{ErrorKind, ExtractError, LingodocError};
pub use extract::{extract_document, DocumentFormat, ExtractedDocument, PageText};
pub use inspect::{inspect_pdf, ContainerMetadata, PageDiagnostics, PdfDiagnostics};
pub use llm::{complete_with_retry, resolve_provider, Completer, ProviderCompleter};
pub use sanitize::{sanitize, sanitize_with_cap, Sanitized, MAX_CONTENT_CHARS};
pub use server::{router, AppState, TranslateResponse};
