//! Server binary for lingodoc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig`, resolves the LLM provider (failing fast when no API key
//! is configured), and serves the axum router.

use anyhow::{Context, Result};
use clap::Parser;
use lingodoc::{AppState, ProviderCompleter, ServiceConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address with the provider auto-detected from env
  export OPENAI_API_KEY=sk-...
  lingodoc

  # Explicit provider, model, and bind address
  lingodoc --provider openai --model gpt-4.1-mini --addr 127.0.0.1:9000

  # Translate into a different language
  lingodoc --target-language French

ENDPOINTS:
  GET  /            welcome banner
  GET  /ping        liveness probe
  POST /translate   multipart: `file` (.pdf/.docx/.txt) and/or `text`
  POST /debug-pdf   multipart: `file` (.pdf) — extraction-quality report

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY      OpenAI API key
  ANTHROPIC_API_KEY   Anthropic API key
  GEMINI_API_KEY      Google Gemini API key

The provider credential is checked at startup; the process exits with an
error when none is configured rather than failing on the first request."#;

/// Document summarization/translation HTTP service.
#[derive(Parser, Debug)]
#[command(
    name = "lingodoc",
    version,
    about = "Summarize and translate documents (PDF, DOCX, plain text) with LLMs",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Socket address to bind.
    #[arg(long, env = "LINGODOC_ADDR", default_value = "0.0.0.0:8000")]
    addr: String,

    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "LINGODOC_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    /// Auto-detected from API-key env vars if not set.
    #[arg(long, env = "LINGODOC_PROVIDER")]
    provider: Option<String>,

    /// Target language for the translation completion.
    #[arg(long, env = "LINGODOC_TARGET_LANGUAGE", default_value = "English")]
    target_language: String,

    /// Max LLM output tokens per completion.
    #[arg(long, env = "LINGODOC_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "LINGODOC_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries per completion on transient failure.
    #[arg(long, env = "LINGODOC_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-completion-call timeout in seconds.
    #[arg(long, env = "LINGODOC_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Cap on simultaneous outbound completion calls.
    #[arg(long, env = "LINGODOC_MAX_CONCURRENT_CALLS", default_value_t = 8)]
    max_concurrent_calls: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LINGODOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LINGODOC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // ── Config ───────────────────────────────────────────────────────────
    let mut builder = ServiceConfig::builder()
        .target_language(cli.target_language)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .max_concurrent_calls(cli.max_concurrent_calls);
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    let config = builder.build().context("invalid configuration")?;

    // ── Provider resolution (fail fast) ──────────────────────────────────
    let provider = lingodoc::resolve_provider(&config)
        .context("could not configure an LLM provider — is an API key set?")?;
    let completer = Arc::new(ProviderCompleter::new(provider, &config));

    // ── Serve ────────────────────────────────────────────────────────────
    let app = lingodoc::router(AppState::new(completer, config));
    let listener = tokio::net::TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    info!("lingodoc listening on {}", cli.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("lingodoc shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
}
