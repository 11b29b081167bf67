//! Detection of annotation leftovers that call for a second translation

use regex::Regex;
use std::sync::OnceLock;

/// Markers some translators leave behind instead of translating
const ANNOTATION_MARKERS: &[&str] = &["lit.", "fig."];

fn parenthetical() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(.+?\)").expect("valid parenthetical pattern"))
}

/// Single-retry policy for suspicious translations
#[derive(Debug, Clone, Copy, Default)]
pub struct RetranslationGuard;

impl RetranslationGuard {
    pub fn new() -> Self {
        Self
    }

    /// True when the translation still carries a parenthetical or an annotation marker
    pub fn should_retry(&self, _original: &str, translated: &str) -> bool {
        parenthetical().is_match(translated)
            || ANNOTATION_MARKERS.iter().any(|m| translated.contains(m))
    }

    /// Input for the retry call: trimmed text terminated with a period
    pub fn retry_input(&self, original: &str) -> String {
        format!("{}.", original.trim())
    }
}
