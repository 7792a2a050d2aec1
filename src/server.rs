//! HTTP surface: routing, multipart intake, and error mapping.
//!
//! The routes and response shapes are a compatibility contract:
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `GET /` | welcome banner |
//! | `GET /ping` | liveness probe |
//! | `POST /translate` | multipart `file` and/or `text` → summary + translation markdown |
//! | `POST /debug-pdf` | multipart `file` (`.pdf` only) → extraction-quality report |
//!
//! Every error body is `{"error": "<message>", "kind": "<category>"}`; the
//! `kind` field is additive over the original single-field shape. All shared
//! state lives in [`AppState`], constructed once at startup and passed in
//! explicitly — handlers own no globals.

use crate::config::ServiceConfig;
use crate::error::LingodocError;
use crate::extract;
use crate::inspect::{self, PdfDiagnostics};
use crate::llm::{complete_with_retry, Completer};
use crate::prompts;
use crate::sanitize;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Upload size ceiling. The sanitizer caps content at 50k characters anyway;
/// accepting arbitrarily large container files would only waste parsing time.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared, read-only request-handling state.
///
/// Constructed once in `main` and handed to [`router`]; the completion
/// provider inside is resolved at startup so a missing credential fails the
/// process, not the first request.
pub struct AppState {
    pub completer: Arc<dyn Completer>,
    pub limiter: Semaphore,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(completer: Arc<dyn Completer>, config: ServiceConfig) -> Arc<Self> {
        Arc::new(Self {
            limiter: Semaphore::new(config.max_concurrent_calls),
            completer,
            config,
        })
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ping", get(ping))
        .route("/translate", post(translate))
        .route("/debug-pdf", post(debug_pdf))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Successful `/translate` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    /// The assembled markdown (summary + translation).
    pub result: String,
    /// The sanitized content hit the length cap before completion; quality
    /// may degrade for the tail of long documents.
    pub truncated: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the AI Translator API." }))
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Translator API is up." }))
}

async fn translate(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TranslateResponse>, ApiError> {
    let parts = read_parts(multipart).await?;

    let content = match (parts.file, parts.text) {
        (Some((filename, bytes)), _) => {
            let doc = extract::extract_document(&filename, bytes).await?;
            let failures = doc.failures().count();
            if failures > 0 {
                warn!(%filename, failures, "extraction completed with page failures");
            }
            doc.text()
        }
        (None, Some(text)) => text,
        (None, None) => return Err(LingodocError::NoContent.into()),
    };

    if content.trim().is_empty() {
        return Err(LingodocError::EmptyContent.into());
    }

    let clean = sanitize::sanitize_with_cap(&content, state.config.max_content_chars);

    let summary_instruction = state
        .config
        .summary_prompt
        .clone()
        .unwrap_or_else(|| prompts::SUMMARY_SYSTEM_PROMPT.to_string());
    let translation_instruction = state
        .config
        .translation_prompt
        .clone()
        .unwrap_or_else(|| prompts::translation_prompt(&state.config.target_language));

    let (summary, translation) = tokio::try_join!(
        complete_with_retry(
            state.completer.as_ref(),
            &state.limiter,
            &summary_instruction,
            &clean.text,
            &state.config,
        ),
        complete_with_retry(
            state.completer.as_ref(),
            &state.limiter,
            &translation_instruction,
            &clean.text,
            &state.config,
        ),
    )?;

    info!(
        chars = clean.text.chars().count(),
        truncated = clean.truncated,
        "translate request completed"
    );

    Ok(Json(TranslateResponse {
        result: prompts::assemble_response(&summary, &translation),
        truncated: clean.truncated,
    }))
}

async fn debug_pdf(
    State(_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PdfDiagnostics>, ApiError> {
    let parts = read_parts(multipart).await?;
    let (filename, bytes) = parts.file.ok_or(LingodocError::NoContent)?;

    if extract::DocumentFormat::from_filename(&filename) != extract::DocumentFormat::Pdf {
        return Err(LingodocError::NotAPdf { filename }.into());
    }

    let report = tokio::task::spawn_blocking(move || inspect::inspect_pdf(&bytes))
        .await
        .map_err(|e| LingodocError::Internal(format!("inspection task panicked: {e}")))??;

    Ok(Json(report))
}

// ── Multipart intake ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RequestParts {
    file: Option<(String, Vec<u8>)>,
    text: Option<String>,
}

/// Collect the `file` and `text` parts, ignoring anything else.
///
/// When both are present the file wins, matching the original service's
/// behaviour — callers may rely on it.
async fn read_parts(mut multipart: Multipart) -> Result<RequestParts, LingodocError> {
    let mut parts = RequestParts::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LingodocError::BadMultipart(e.to_string()))?
    {
        // Own the name up front: `bytes()`/`text()` consume the field.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| LingodocError::BadMultipart(e.to_string()))?;
                parts.file = Some((filename, bytes.to_vec()));
            }
            Some("text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| LingodocError::BadMultipart(e.to_string()))?;
                parts.text = Some(text);
            }
            _ => {}
        }
    }

    Ok(parts)
}

// ── Error mapping ────────────────────────────────────────────────────────────

/// Wrapper turning [`LingodocError`] into the JSON error contract.
#[derive(Debug)]
pub struct ApiError(pub LingodocError);

impl From<LingodocError> for ApiError {
    fn from(e: LingodocError) -> Self {
        Self(e)
    }
}

fn status_for(error: &LingodocError) -> StatusCode {
    match error {
        LingodocError::NoContent
        | LingodocError::InvalidEncoding { .. }
        | LingodocError::NotAPdf { .. }
        | LingodocError::BadMultipart(_) => StatusCode::BAD_REQUEST,
        LingodocError::EmptyContent => StatusCode::UNPROCESSABLE_ENTITY,
        LingodocError::ProviderNotConfigured { .. }
        | LingodocError::Completion { .. }
        | LingodocError::CompletionTimeout { .. }
        | LingodocError::InvalidConfig(_)
        | LingodocError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("request failed: {}", self.0);
        }
        let body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        (status, Json(body)).into_response()
    }
}
