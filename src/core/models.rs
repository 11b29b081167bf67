//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Translation service backing a provider client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// DeepL API (primary, quota-checked)
    Deepl,
    /// Google Cloud Translation v2 (fallback)
    Google,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Deepl => write!(f, "deepl"),
            ProviderKind::Google => write!(f, "google"),
        }
    }
}

/// Which of the two configured providers serves a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderSelection {
    /// Quota-checked primary provider
    Primary,
    /// Fallback provider
    Secondary,
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSelection::Primary => write!(f, "primary"),
            ProviderSelection::Secondary => write!(f, "secondary"),
        }
    }
}

/// One usage counter as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub count: u64,
    pub limit: u64,
}

impl UsageCounter {
    pub fn new(count: u64, limit: u64) -> Self {
        Self { count, limit }
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }

    pub fn limit_reached(&self) -> bool {
        self.limit > 0 && self.count >= self.limit
    }
}

/// Point-in-time usage view of the primary provider.
///
/// A `None` counter means the provider did not report that kind of usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub character: Option<UsageCounter>,
    pub document: Option<UsageCounter>,
    pub any_limit_reached: bool,
}

impl UsageSnapshot {
    /// Snapshot with only character usage reported
    pub fn characters(count: u64, limit: u64) -> Self {
        let counter = UsageCounter::new(count, limit);
        Self {
            character: Some(counter),
            document: None,
            any_limit_reached: counter.limit_reached(),
        }
    }
}

/// One file's translation task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationJob {
    pub source_file: PathBuf,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationJob {
    pub fn new(
        source_file: impl Into<PathBuf>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    /// Suffix carried by output files, e.g. `.fr.srt`
    pub fn output_suffix(&self) -> String {
        output_suffix(&self.target_lang)
    }

    /// True when the source file is itself a translation into the target language
    pub fn is_translated_output(&self) -> bool {
        has_output_suffix(&self.source_file, &self.target_lang)
    }

    /// Sibling path the translation is written to: `name.srt` -> `name.<lang>.srt`
    pub fn output_path(&self) -> PathBuf {
        let stem = self
            .source_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.source_file
            .with_file_name(format!("{}{}", stem, self.output_suffix()))
    }

    /// File name used in log lines
    pub fn display_name(&self) -> String {
        self.source_file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_file.display().to_string())
    }
}

/// Lowercased output suffix for a target language
pub fn output_suffix(target_lang: &str) -> String {
    format!(".{}.srt", target_lang).to_lowercase()
}

/// Case-insensitive check for the output suffix anywhere in the file name
pub fn has_output_suffix(path: &Path, target_lang: &str) -> bool {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_lowercase()
                .contains(&output_suffix(target_lang))
        })
        .unwrap_or(false)
}

/// Result of processing one subtitle line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResult {
    pub original: String,
    pub translated: String,
    pub was_translated: bool,
}

impl LineResult {
    /// Untranslated line with its terminator normalized to `\n`
    pub fn passthrough(line: &str) -> Self {
        let body = line.trim_end_matches(&['\r', '\n'][..]);
        let translated = if line.ends_with('\n') {
            format!("{}\n", body)
        } else {
            body.to_string()
        };
        Self {
            original: line.to_string(),
            translated,
            was_translated: false,
        }
    }
}

/// Outcome of one job, produced by its worker
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job: TranslationJob,
    pub provider: Option<ProviderKind>,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn succeeded(job: TranslationJob, provider: ProviderKind, output: PathBuf) -> Self {
        Self {
            job,
            provider: Some(provider),
            output: Some(output),
            error: None,
        }
    }

    pub fn failed(job: TranslationJob, provider: Option<ProviderKind>, error: impl ToString) -> Self {
        Self {
            job,
            provider,
            output: None,
            error: Some(error.to_string()),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of one dispatcher run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.success())
    }
}

/// Format a duration as `H:MM:SS`, rounded to whole seconds
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = (elapsed.as_millis() + 500) / 1000;
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format a count with `,` thousands separators
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
