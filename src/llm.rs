//! Completion boundary: build chat messages and call the provider.
//!
//! This module is intentionally thin — prompt text lives in
//! [`crate::prompts`] so it can change without touching retry or
//! error-handling logic here. The [`Completer`] trait is the seam the rest
//! of the crate (and the test suite) programs against; production wires in
//! [`ProviderCompleter`], tests substitute a scripted implementation.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient and frequent under
//! concurrent load. Exponential backoff (`retry_backoff_ms * 2^attempt`)
//! avoids thundering-herd: with 500 ms base and 3 retries the wait sequence
//! is 500 ms → 1 s → 2 s. Permanent failures (bad key, malformed request)
//! are never retried — they surface immediately. Every attempt runs under a
//! timeout, and a process-wide semaphore caps simultaneous outbound calls so
//! a burst of uploads cannot turn into an unbounded burst against a metered
//! API.

use crate::config::ServiceConfig;
use crate::error::LingodocError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// The external summarization/translation collaborator, reduced to the one
/// capability this service consumes: system instruction + user content in,
/// one text response out.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, system: &str, content: &str) -> Result<String, LingodocError>;
}

/// Production [`Completer`] backed by an [`edgequake_llm::LLMProvider`].
pub struct ProviderCompleter {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderCompleter {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl Completer for ProviderCompleter {
    async fn complete(&self, system: &str, content: &str) -> Result<String, LingodocError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(content)];
        match self.provider.chat(&messages, Some(&self.options)).await {
            Ok(response) => {
                debug!(
                    prompt_tokens = response.prompt_tokens,
                    completion_tokens = response.completion_tokens,
                    "completion succeeded"
                );
                Ok(response.content)
            }
            Err(e) => {
                let detail = e.to_string();
                Err(LingodocError::Completion {
                    transient: is_transient(&detail),
                    detail,
                })
            }
        }
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed it
///    entirely; used as-is (tests, custom middleware).
/// 2. **Named provider** (`config.provider_name`) — reads the matching API
///    key (`OPENAI_API_KEY`, etc.) from the environment.
/// 3. **Auto-detection** — the factory scans all known API-key variables
///    and picks the first available provider.
///
/// Called once at startup so a missing credential aborts the process with a
/// clear message instead of turning into a 500 on the first request.
pub fn resolve_provider(config: &ServiceConfig) -> Result<Arc<dyn LLMProvider>, LingodocError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            LingodocError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        });
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| LingodocError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from the environment.\n\
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                 Error: {e}"
            ),
        })?;
    Ok(provider)
}

/// Run one completion with timeout, bounded retry, and backoff.
///
/// Holds a semaphore permit for the whole attempt sequence, so the permit
/// count caps *logical* completions in flight, not individual attempts.
/// Timeouts count as transient; permanent provider errors return
/// immediately.
pub async fn complete_with_retry(
    completer: &dyn Completer,
    limiter: &Semaphore,
    system: &str,
    content: &str,
    config: &ServiceConfig,
) -> Result<String, LingodocError> {
    let _permit = limiter
        .acquire()
        .await
        .map_err(|_| LingodocError::Internal("completion limiter closed".into()))?;

    let mut last_err: Option<LingodocError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "completion retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let call = completer.complete(system, content);
        match timeout(Duration::from_secs(config.api_timeout_secs), call).await {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => {
                let transient = matches!(e, LingodocError::Completion { transient: true, .. });
                warn!("completion attempt {} failed — {e}", attempt + 1);
                if !transient {
                    return Err(e);
                }
                last_err = Some(e);
            }
            Err(_elapsed) => {
                warn!(
                    "completion attempt {} timed out after {}s",
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(LingodocError::CompletionTimeout {
                    secs: config.api_timeout_secs,
                });
            }
        }
    }

    Err(last_err
        .unwrap_or_else(|| LingodocError::Internal("completion failed with no attempts".into())))
}

/// Heuristic transient/permanent split on the provider's rendered error.
///
/// The provider layer does not expose a stable machine-readable taxonomy at
/// this seam, so we match on the message. Kept in one place so a typed
/// upstream error can replace it without touching the retry loop.
fn is_transient(detail: &str) -> bool {
    let lower = detail.to_ascii_lowercase();
    const MARKERS: &[&str] = &[
        "429",
        "rate limit",
        "too many requests",
        "timeout",
        "timed out",
        "connection",
        "temporarily",
        "overloaded",
        "unavailable",
        "502",
        "503",
        "504",
    ];
    MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted completer: fails `failures` times, then succeeds.
    struct FlakyCompleter {
        calls: AtomicU32,
        failures: u32,
        transient: bool,
    }

    impl FlakyCompleter {
        fn new(failures: u32, transient: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                transient,
            }
        }
    }

    #[async_trait]
    impl Completer for FlakyCompleter {
        async fn complete(&self, _system: &str, content: &str) -> Result<String, LingodocError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(LingodocError::Completion {
                    detail: "scripted failure".into(),
                    transient: self.transient,
                })
            } else {
                Ok(format!("echo: {content}"))
            }
        }
    }

    /// Completer that never returns within any reasonable timeout.
    struct StalledCompleter;

    #[async_trait]
    impl Completer for StalledCompleter {
        async fn complete(&self, _system: &str, _content: &str) -> Result<String, LingodocError> {
            sleep(Duration::from_secs(3600)).await;
            unreachable!("the timeout should have fired")
        }
    }

    fn fast_config() -> ServiceConfig {
        ServiceConfig::builder()
            .max_retries(2)
            .retry_backoff_ms(1)
            .api_timeout_secs(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn transient_failures_are_retried_to_success() {
        let completer = FlakyCompleter::new(2, true);
        let limiter = Semaphore::new(1);
        let out = complete_with_retry(&completer, &limiter, "sys", "hello", &fast_config())
            .await
            .unwrap();
        assert_eq!(out, "echo: hello");
        assert_eq!(completer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let completer = FlakyCompleter::new(5, false);
        let limiter = Semaphore::new(1);
        let err = complete_with_retry(&completer, &limiter, "sys", "hello", &fast_config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LingodocError::Completion {
                transient: false,
                ..
            }
        ));
        assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_exhaust_retries() {
        let completer = FlakyCompleter::new(10, true);
        let limiter = Semaphore::new(1);
        let err = complete_with_retry(&completer, &limiter, "sys", "hello", &fast_config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LingodocError::Completion { transient: true, .. }
        ));
        // initial attempt + max_retries
        assert_eq!(completer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_call_times_out() {
        let limiter = Semaphore::new(1);
        let err = complete_with_retry(&StalledCompleter, &limiter, "sys", "hello", &fast_config())
            .await
            .unwrap_err();
        assert!(matches!(err, LingodocError::CompletionTimeout { secs: 1 }));
    }

    #[test]
    fn transient_markers() {
        assert!(is_transient("HTTP 429 Too Many Requests"));
        assert!(is_transient("rate limit exceeded"));
        assert!(is_transient("upstream connection reset"));
        assert!(is_transient("503 Service Unavailable"));
        assert!(!is_transient("invalid API key"));
        assert!(!is_transient("400 Bad Request: unknown model"));
    }
}
