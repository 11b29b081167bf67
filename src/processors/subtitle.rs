//! Subtitle file processor: line-by-line translation of `.srt` files

use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};
use crate::core::guard::RetranslationGuard;
use crate::core::models::{LineResult, TranslationJob};
use crate::providers::Translator;

/// Latin letters or CJK unified ideographs
const TRANSLATABLE_PATTERN: &str = r"[a-zA-Z\x{4e00}-\x{9fff}]+";

/// Subtitle processor that translates text lines and keeps the rest verbatim
#[derive(Debug, Clone)]
pub struct SubtitleProcessor {
    text_pattern: Regex,
    guard: RetranslationGuard,
}

impl Default for SubtitleProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleProcessor {
    /// Create a new subtitle processor
    pub fn new() -> Self {
        Self {
            text_pattern: Regex::new(TRANSLATABLE_PATTERN).expect("valid text pattern"),
            guard: RetranslationGuard::new(),
        }
    }

    /// Find subtitle files directly inside `dir`
    pub fn find_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| TranslationError::file(dir, e))?;
            let path = entry.path();
            if path.is_file() && self.is_subtitle_file(path) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        Ok(files)
    }

    /// Check if file is a SubRip subtitle
    fn is_subtitle_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
            .unwrap_or(false)
    }

    /// Whether a line carries text worth sending to a provider
    pub fn is_translatable(&self, line: &str) -> bool {
        self.text_pattern.is_match(line)
    }

    /// Translate one line, or pass it through when it has no text.
    ///
    /// Output lines end with `\n` whatever the input terminator was.
    pub async fn translate_line(&self, translator: &dyn Translator, line: &str) -> Result<LineResult> {
        if !self.is_translatable(line) {
            return Ok(LineResult::passthrough(line));
        }

        let text = line.trim_end_matches(&['\r', '\n'][..]);
        let mut translation = translator.translate(text).await?;

        if self.guard.should_retry(text, &translation) {
            let retry = translator.translate(&self.guard.retry_input(text)).await?;
            info!("Retranslation for text: {}, New translation: {}", translation, retry);
            translation = retry;
        }

        let translated = format!("{}\n", translation.trim_end_matches(&['\r', '\n'][..]));
        debug!(
            "{} --translated with {} to-- {}",
            text,
            translator.kind(),
            translated.trim_end()
        );

        Ok(LineResult {
            original: line.to_string(),
            translated,
            was_translated: true,
        })
    }

    /// Translate every line of a subtitle document
    pub async fn translate_content(&self, translator: &dyn Translator, content: &str) -> Result<String> {
        let mut output = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            let result = self.translate_line(translator, line).await?;
            output.push_str(&result.translated);
        }
        Ok(output)
    }

    /// Translate a single subtitle file into its target-language sibling.
    ///
    /// The output is written to a `.part` file first and renamed into place
    /// once the whole file has been translated.
    pub async fn translate_file(&self, job: &TranslationJob, translator: &dyn Translator) -> Result<PathBuf> {
        let input = &job.source_file;
        info!(
            "Starting translation for file: {}, New suffix: {}",
            job.display_name(),
            job.output_suffix()
        );

        let content = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| TranslationError::file(input, e))?;

        let translated = self.translate_content(translator, &content).await?;

        let output = job.output_path();
        let partial = partial_path(&output);
        tokio::fs::write(&partial, translated)
            .await
            .map_err(|e| TranslationError::file(&partial, e))?;
        if let Err(e) = tokio::fs::rename(&partial, &output).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(TranslationError::file(&output, e));
        }

        info!("New file created Name: {}", output.display());
        Ok(output)
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}
