//! Configuration types for the translation service.
//!
//! All request-handling behaviour is controlled through [`ServiceConfig`],
//! built via its [`ServiceConfigBuilder`]. Keeping every knob in one struct
//! makes it trivial to share the config across handlers, serialise it for
//! logging, and diff two deployments to understand why their outputs differ.

use crate::error::LingodocError;
use crate::sanitize::MAX_CONTENT_CHARS;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for the summarize/translate pipeline.
///
/// Built via [`ServiceConfig::builder()`] or [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use lingodoc::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .model("gpt-4.1-nano")
///     .target_language("French")
///     .max_retries(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected from
    /// API-key environment variables.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for completions. Default: 0.2.
    ///
    /// Summaries and translations should stay faithful to the source text;
    /// higher values trade fidelity for paraphrase.
    pub temperature: f32,

    /// Maximum tokens the model may generate per completion. Default: 4096.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient completion failure. Default: 3.
    ///
    /// Permanent errors (bad API key, malformed request) are not retried —
    /// they surface immediately as [`LingodocError::Completion`].
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Per-completion-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Cap on simultaneous outbound completion calls across all requests.
    /// Default: 8.
    ///
    /// Each `/translate` request issues two completions; without a cap, a
    /// burst of uploads turns directly into a burst against a metered API.
    pub max_concurrent_calls: usize,

    /// Maximum sanitized content length in characters. Default: 50 000.
    pub max_content_chars: usize,

    /// Target language for the translation completion. Default: "English".
    pub target_language: String,

    /// Custom summary instruction. If None, uses the built-in default.
    pub summary_prompt: Option<String>,

    /// Custom translation instruction. If None, built from `target_language`.
    pub translation_prompt: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            max_concurrent_calls: 8,
            max_content_chars: MAX_CONTENT_CHARS,
            target_language: "English".to_string(),
            summary_prompt: None,
            translation_prompt: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_concurrent_calls", &self.max_concurrent_calls)
            .field("max_content_chars", &self.max_content_chars)
            .field("target_language", &self.target_language)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn max_concurrent_calls(mut self, n: usize) -> Self {
        self.config.max_concurrent_calls = n.max(1);
        self
    }

    pub fn max_content_chars(mut self, n: usize) -> Self {
        self.config.max_content_chars = n;
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    pub fn summary_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.summary_prompt = Some(prompt.into());
        self
    }

    pub fn translation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.translation_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, LingodocError> {
        let c = &self.config;
        if c.max_content_chars == 0 {
            return Err(LingodocError::InvalidConfig(
                "max_content_chars must be ≥ 1".into(),
            ));
        }
        if c.max_concurrent_calls == 0 {
            return Err(LingodocError::InvalidConfig(
                "max_concurrent_calls must be ≥ 1".into(),
            ));
        }
        if c.target_language.trim().is_empty() {
            return Err(LingodocError::InvalidConfig(
                "target_language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_matches_sanitizer() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_content_chars, MAX_CONTENT_CHARS);
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = ServiceConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_blank_language() {
        let result = ServiceConfig::builder().target_language("  ").build();
        assert!(matches!(result, Err(LingodocError::InvalidConfig(_))));
    }

    #[test]
    fn builder_floors_concurrency() {
        let config = ServiceConfig::builder()
            .max_concurrent_calls(0)
            .build()
            .unwrap();
        assert_eq!(config.max_concurrent_calls, 1);
    }
}
