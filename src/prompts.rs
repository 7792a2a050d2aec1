//! Instruction templates for the summarize/translate pipeline.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the service's behaviour (e.g.
//!    tightening the summary format) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts and the assembled
//!    response without a live completion API.
//!
//! Callers can override either instruction via
//! [`crate::config::ServiceConfig`]; the constants here are used only when
//! no override is provided.

/// Default system instruction for the summary completion.
pub const SUMMARY_SYSTEM_PROMPT: &str =
    "Summarize this document in structured bullet points or sections.";

/// Build the translation instruction for a target language.
pub fn translation_prompt(target_language: &str) -> String {
    format!("Translate this document to {target_language}.")
}

/// Assemble the final markdown response from the two completions.
pub fn assemble_response(summary: &str, translation: &str) -> String {
    format!("### Summary\n\n{summary}\n\n---\n\n### Translation\n\n{translation}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_prompt_names_the_language() {
        assert_eq!(
            translation_prompt("English"),
            "Translate this document to English."
        );
        assert_eq!(
            translation_prompt("Japanese"),
            "Translate this document to Japanese."
        );
    }

    #[test]
    fn response_scaffold_is_stable() {
        let out = assemble_response("- point", "bonjour");
        assert_eq!(
            out,
            "### Summary\n\n- point\n\n---\n\n### Translation\n\nbonjour"
        );
    }
}
