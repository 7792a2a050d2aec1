//! Sanitization: deterministic cleanup of extracted document text.
//!
//! ## Why is sanitization necessary?
//!
//! Text pulled out of a binary container is not always text. When PDF
//! extraction partially fails, raw container syntax leaks into the output —
//! object headers, compressed `stream … endstream` spans, filter
//! declarations — none of which belongs in a prompt sent to a language
//! model. This module applies a fixed sequence of cheap, deterministic
//! rules that strip those artifacts without touching legitimate content.
//!
//! ## Rule Order
//!
//! The rules must run in this specific order: span-level regex stripping
//! before the keyword vocabulary (so `stream … endstream` blocks are removed
//! whole rather than leaving their payload behind), the printable filter
//! before whitespace collapsing (stripped control characters become spaces
//! that the collapse pass then folds), and the non-ASCII heuristic last so
//! it measures the text that will actually be sent downstream.
//!
//! Every rule is a pure function (`&str → String`) with no shared state, and
//! the whole pipeline is idempotent: running [`sanitize`] on its own output
//! returns the same text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Maximum sanitized content length in characters.
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// How many leading characters are scanned for a container signature.
const SIGNATURE_WINDOW: usize = 100;

/// How many leading characters feed the non-ASCII heuristic.
const NON_ASCII_WINDOW: usize = 1_000;

/// Non-ASCII fraction above which the aggressive pass runs.
const NON_ASCII_THRESHOLD: f64 = 0.2;

/// Sanitizer output: the cleaned text plus observability flags.
///
/// The flags never change the text; they exist so callers and operators can
/// see *what happened* — a leaked container signature, an aggressive
/// non-ASCII pass, a silent truncation — without diffing input and output.
#[derive(Debug, Clone)]
pub struct Sanitized {
    /// Cleaned text: printable-or-whitespace only, length ≤ the cap.
    pub text: String,
    /// A versioned container signature (e.g. `%PDF-1.7`) appeared near the
    /// start of the input. Quality-warning signal only.
    pub container_signature: bool,
    /// The non-ASCII second pass ran.
    pub aggressive_pass: bool,
    /// The result was truncated to the cap.
    pub truncated: bool,
    /// Character count of the input, before any rule ran.
    pub original_chars: usize,
}

/// Sanitize extracted text with the default cap of [`MAX_CONTENT_CHARS`].
pub fn sanitize(input: &str) -> Sanitized {
    sanitize_with_cap(input, MAX_CONTENT_CHARS)
}

/// Sanitize extracted text, truncating the result to `cap` characters.
///
/// Rules (applied in order):
/// 1. Detect (and log, never strip on its own) a leading container signature
/// 2. Strip binary container syntax spans via regex substitution
/// 3. Replace a fixed vocabulary of structural keywords with a space
/// 4. Replace every character that is neither printable nor whitespace
/// 5. Collapse whitespace runs to one space and trim
/// 6. If > 20% of the first 1 000 chars are non-ASCII, run the aggressive
///    pass and re-collapse
/// 7. Truncate to `cap` characters (logged, and flagged on the result)
pub fn sanitize_with_cap(input: &str, cap: usize) -> Sanitized {
    let original_chars = input.chars().count();

    let container_signature = has_container_signature(input);
    if container_signature {
        warn!("container signature found in extracted text; extraction likely leaked raw bytes");
    }

    let s = strip_container_syntax(input);
    let s = strip_structural_keywords(&s);
    let s = replace_non_printable(&s);
    let s = collapse_whitespace(&s);

    let ratio = non_ascii_ratio(&s);
    let (s, aggressive_pass) = if ratio > NON_ASCII_THRESHOLD {
        debug!(ratio, "non-ASCII ratio above threshold; running aggressive pass");
        (collapse_whitespace(&strip_non_word_symbols(&s)), true)
    } else {
        (s, false)
    };

    let (text, truncated) = truncate_chars(s, cap);
    if truncated {
        warn!(
            original_chars,
            cap, "sanitized content truncated; downstream quality may degrade"
        );
    }

    Sanitized {
        text,
        container_signature,
        aggressive_pass,
        truncated,
        original_chars,
    }
}

// ── Rule 1: Container signature detection ────────────────────────────────────

static RE_PDF_SIGNATURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"%PDF-\d+\.\d+").unwrap());

fn has_container_signature(input: &str) -> bool {
    let head: String = input.chars().take(SIGNATURE_WINDOW).collect();
    RE_PDF_SIGNATURE.is_match(&head)
}

// ── Rule 2: Strip binary container syntax ────────────────────────────────────

/// `N M obj … endobj` spans, non-greedy, across newlines.
static RE_OBJECT_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\d+\s+\d+\s+obj\b.*?\bendobj\b").unwrap());

/// `stream … endstream` spans, non-greedy, across newlines.
static RE_STREAM_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\bstream\b.*?\bendstream\b").unwrap());

/// Inline metadata directives: filter and length declarations.
static RE_METADATA_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:Filter|DecodeParms)\s*/\w+|/Length\s+\d+").unwrap());

fn strip_container_syntax(input: &str) -> String {
    let s = RE_PDF_SIGNATURE.replace_all(input, " ");
    let s = RE_OBJECT_SPAN.replace_all(&s, " ");
    let s = RE_STREAM_SPAN.replace_all(&s, " ");
    RE_METADATA_DIRECTIVE.replace_all(&s, " ").into_owned()
}

// ── Rule 3: Structural keyword vocabulary ────────────────────────────────────

/// Leftover tokens that survive rule 2 when a span is unbalanced (a `stream`
/// with no matching `endstream`, a dangling `endobj`). Longest token first so
/// `endstream` never degrades into `end` + a stray `stream` hit.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "endstream",
    "FlateDecode",
    "ASCIIHexDecode",
    "ASCII85Decode",
    "startxref",
    "endobj",
    "trailer",
    "stream",
    "xref",
    "obj",
];

fn strip_structural_keywords(input: &str) -> String {
    let mut s = input.to_string();
    for keyword in STRUCTURAL_KEYWORDS {
        if s.contains(keyword) {
            s = s.replace(keyword, " ");
        }
    }
    s
}

// ── Rule 4: Printable-or-whitespace filter ───────────────────────────────────

/// A character survives when it is printable or whitespace; everything else
/// (control characters, stray NULs from binary leakage) becomes a space.
fn replace_non_printable(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_control() && !c.is_whitespace() {
                ' '
            } else {
                c
            }
        })
        .collect()
}

// ── Rule 5: Whitespace collapse ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}

// ── Rule 6: Aggressive non-ASCII pass ────────────────────────────────────────

/// Fraction of non-ASCII characters within the leading window.
fn non_ascii_ratio(input: &str) -> f64 {
    let head: Vec<char> = input.chars().take(NON_ASCII_WINDOW).collect();
    if head.is_empty() {
        return 0.0;
    }
    let non_ascii = head.iter().filter(|c| !c.is_ascii()).count();
    non_ascii as f64 / head.len() as f64
}

/// Deletes everything outside word characters, whitespace, and basic
/// punctuation. Unicode letters survive (`\w` is Unicode-aware); symbol
/// salad from mis-decoded binary does not.
static RE_NON_WORD_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,;:!?()\-]").unwrap());

fn strip_non_word_symbols(input: &str) -> String {
    RE_NON_WORD_SYMBOL.replace_all(input, "").into_owned()
}

// ── Rule 7: Length cap ───────────────────────────────────────────────────────

fn truncate_chars(s: String, cap: usize) -> (String, bool) {
    match s.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut t = s;
            t.truncate(byte_idx);
            // The cut can land just after a space; trim so the output never
            // ends in whitespace and re-sanitizing it is a no-op.
            t.truncate(t.trim_end().len());
            (t, true)
        }
        None => (s, false),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
