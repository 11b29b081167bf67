//! Batch dispatcher: provider selection and bounded concurrent file jobs

use indicatif::ProgressBar;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{format_elapsed, BatchReport, JobOutcome, ProviderSelection, TranslationJob};
use crate::core::quota::QuotaGate;
use crate::processors::subtitle::SubtitleProcessor;
use crate::providers::Translator;

/// Runs one translation job per subtitle file.
///
/// Provider choice is re-evaluated for every file right before it starts, so
/// a primary quota exhausted mid-batch moves the remaining files to the
/// secondary provider.
#[derive(Clone)]
pub struct JobDispatcher {
    primary: Arc<dyn Translator>,
    secondary: Arc<dyn Translator>,
    gate: QuotaGate,
    processor: Arc<SubtitleProcessor>,
    progress: Option<ProgressBar>,
}

impl fmt::Debug for JobDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl JobDispatcher {
    /// Create a dispatcher over a quota-gated primary and a fallback provider
    pub fn new(primary: Arc<dyn Translator>, secondary: Arc<dyn Translator>, gate: QuotaGate) -> Self {
        Self {
            primary,
            secondary,
            gate,
            processor: Arc::new(SubtitleProcessor::new()),
            progress: None,
        }
    }

    /// Advance `progress` once per finished job
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn gate(&self) -> &QuotaGate {
        &self.gate
    }

    /// One job per subtitle file in `dir`; an unreadable directory is fatal
    pub fn jobs_from_dir(&self, dir: &Path, source_lang: &str, target_lang: &str) -> Result<Vec<TranslationJob>> {
        let files = self.processor.find_files(dir)?;
        Ok(files
            .into_iter()
            .map(|file| TranslationJob::new(file, source_lang, target_lang))
            .collect())
    }

    /// Pick the provider for the next job
    pub async fn select_provider(&self) -> ProviderSelection {
        if self.gate.is_usable().await {
            ProviderSelection::Primary
        } else {
            ProviderSelection::Secondary
        }
    }

    fn translator(&self, selection: ProviderSelection) -> Arc<dyn Translator> {
        match selection {
            ProviderSelection::Primary => Arc::clone(&self.primary),
            ProviderSelection::Secondary => Arc::clone(&self.secondary),
        }
    }

    /// Translate every pending job with at most `max_concurrency` in flight.
    ///
    /// Per-file failures end up in the report; they never abort the batch.
    pub async fn run(&self, jobs: Vec<TranslationJob>, max_concurrency: usize) -> BatchReport {
        self.gate.report_usage().await;

        let jobs = pending_jobs(jobs);
        if jobs.is_empty() {
            info!("No srt file to be translated was found, nothing to do");
            return BatchReport::default();
        }

        let workers = max_concurrency.max(1).min(jobs.len());
        info!("Translating {} files with {} workers", jobs.len(), workers);

        let start_time = Instant::now();
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(jobs.len());

        for job in jobs {
            let dispatcher = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let task_job = job.clone();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return JobOutcome::failed(task_job, None, e),
                };
                dispatcher.run_job(task_job).await
            });
            handles.push((job, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (job, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => JobOutcome::failed(job, None, TranslationError::JobAborted(e.to_string())),
            };
            outcomes.push(outcome);
        }

        let report = BatchReport {
            outcomes,
            elapsed: start_time.elapsed(),
        };

        info!("Translations Duration: {}", format_elapsed(report.elapsed));
        self.gate.report_usage().await;

        for failure in report.failures() {
            error!(
                "Translation failed for {}: {}",
                failure.job.display_name(),
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
        info!(
            "All translations done! {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        report
    }

    /// Translate one file with the provider selected for it
    async fn run_job(&self, job: TranslationJob) -> JobOutcome {
        let selection = self.select_provider().await;
        let translator = self.translator(selection);
        let provider = translator.kind();
        info!("Using {} provider ({}) for {}", selection, provider, job.display_name());

        let outcome = match self.processor.translate_file(&job, translator.as_ref()).await {
            Ok(output) => JobOutcome::succeeded(job, provider, output),
            Err(e) => {
                warn!("Job failed for {}: {}", job.display_name(), e);
                JobOutcome::failed(job, Some(provider), e)
            }
        };

        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        outcome
    }
}

/// Drop jobs whose file is already a translation into the target language
pub fn pending_jobs(jobs: Vec<TranslationJob>) -> Vec<TranslationJob> {
    jobs.into_iter().filter(|job| !job.is_translated_output()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ProviderKind, UsageSnapshot};
    use crate::providers::mock::{MockTranslator, MockUsage};
    use std::path::PathBuf;
    use std::time::Duration;

    fn dispatcher(
        primary: Arc<MockTranslator>,
        secondary: Arc<MockTranslator>,
        usage: UsageSnapshot,
    ) -> JobDispatcher {
        let gate = QuotaGate::new(MockUsage::new(usage).shared(), 10);
        JobDispatcher::new(primary, secondary, gate)
    }

    fn write_subs(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), "1\n00:00:01,000 --> 00:00:02,000\nHello world\n").unwrap();
        }
    }

    fn names(outcomes: &[JobOutcome]) -> Vec<String> {
        let mut names: Vec<String> = outcomes.iter().map(|o| o.job.display_name()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_pending_jobs_excludes_translated_outputs() {
        let jobs = ["a.srt", "b.srt", "b.fr.srt", "c.FR.srt"]
            .iter()
            .map(|name| TranslationJob::new(PathBuf::from(name), "en", "fr"))
            .collect();

        let pending: Vec<String> = pending_jobs(jobs).iter().map(|j| j.display_name()).collect();
        assert_eq!(pending, vec!["a.srt", "b.srt"]);
    }

    #[tokio::test]
    async fn test_run_uses_primary_with_quota() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt", "b.srt", "b.fr.srt"]);

        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary.clone(), secondary.clone(), UsageSnapshot::characters(0, 500_000));

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        assert_eq!(jobs.len(), 3);

        let report = dispatcher.run(jobs, 4).await;
        assert_eq!(names(&report.outcomes), vec!["a.srt", "b.srt"]);
        assert_eq!(report.succeeded(), 2);
        assert!(report.outcomes.iter().all(|o| o.provider == Some(ProviderKind::Deepl)));
        assert_eq!(primary.call_count(), 2);
        assert_eq!(secondary.call_count(), 0);

        let written = std::fs::read_to_string(dir.path().join("a.fr.srt")).unwrap();
        assert_eq!(written, "1\n00:00:01,000 --> 00:00:02,000\n[deepl] Hello world\n");
    }

    #[tokio::test]
    async fn test_run_falls_back_when_quota_margin_reached() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt", "b.srt"]);

        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(
            primary.clone(),
            secondary.clone(),
            UsageSnapshot::characters(999_990, 1_000_000),
        );

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 2).await;

        assert_eq!(report.succeeded(), 2);
        assert!(report.outcomes.iter().all(|o| o.provider == Some(ProviderKind::Google)));
        assert_eq!(primary.call_count(), 0);
        assert_eq!(secondary.call_count(), 2);
    }

    #[tokio::test]
    async fn test_quota_exhausted_mid_batch_moves_remaining_files_to_secondary() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt", "b.srt", "c.srt"]);

        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        // Queries: opening report, file a, then exhausted for b, c and the closing report.
        let usage = MockUsage::scripted(vec![
            UsageSnapshot::characters(0, 1_000),
            UsageSnapshot::characters(0, 1_000),
            UsageSnapshot::characters(1_000, 1_000),
        ])
        .shared();
        let gate = QuotaGate::new(usage.clone(), 10);
        let dispatcher = JobDispatcher::new(primary.clone(), secondary.clone(), gate);

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 1).await;

        assert_eq!(report.succeeded(), 3);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 2);

        let deepl_files: Vec<String> = report
            .outcomes
            .iter()
            .filter(|o| o.provider == Some(ProviderKind::Deepl))
            .map(|o| o.job.display_name())
            .collect();
        assert_eq!(deepl_files, vec!["a.srt"]);
        assert_eq!(usage.query_count(), 5);
    }

    #[tokio::test]
    async fn test_disabled_primary_routes_everything_to_secondary() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt", "b.srt"]);

        let primary = MockTranslator::disabled(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let usage = MockUsage::disabled().shared();
        let gate = QuotaGate::new(usage.clone(), 10);
        let dispatcher = JobDispatcher::new(primary.clone(), secondary.clone(), gate);

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 2).await;

        assert_eq!(report.succeeded(), 2);
        assert!(report.outcomes.iter().all(|o| o.provider == Some(ProviderKind::Google)));
        assert_eq!(primary.call_count(), 0);
        assert_eq!(secondary.call_count(), 2);
        assert_eq!(usage.query_count(), 0);
    }

    #[tokio::test]
    async fn test_run_falls_back_when_usage_unknown() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt"]);

        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let gate = QuotaGate::new(MockUsage::failing().shared(), 10);
        let dispatcher = JobDispatcher::new(primary.clone(), secondary.clone(), gate);

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 2).await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(primary.call_count(), 0);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rerun_never_translates_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt"]);

        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary, secondary, UsageSnapshot::characters(0, 500_000));

        for _ in 0..2 {
            let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
            let report = dispatcher.run(jobs, 2).await;
            assert_eq!(names(&report.outcomes), vec!["a.srt"]);
        }
        assert!(!dir.path().join("a.fr.fr.srt").exists());
    }

    #[tokio::test]
    async fn test_failed_file_does_not_affect_others() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt", "b.srt"]);
        // Invalid UTF-8 makes the read fail for this file only.
        std::fs::write(dir.path().join("corrupt.srt"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary, secondary, UsageSnapshot::characters(0, 500_000));

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 3).await;

        assert_eq!(report.outcomes.len(), 3);
        for outcome in &report.outcomes {
            let corrupt = outcome.job.display_name() == "corrupt.srt";
            assert_eq!(outcome.success(), !corrupt);
        }
        assert!(report.outcomes.iter().any(|o| o.error.as_deref().unwrap_or("").contains("corrupt.srt")));
        assert!(!dir.path().join("corrupt.fr.srt").exists());
    }

    #[tokio::test]
    async fn test_translate_errors_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        write_subs(dir.path(), &["a.srt"]);
        std::fs::write(dir.path().join("b.srt"), "1\nBroken line\n").unwrap();

        let primary = MockTranslator::new(ProviderKind::Deepl).failing_on("Broken line").shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary, secondary, UsageSnapshot::characters(0, 500_000));

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 2).await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.job.display_name(), "b.srt");
        assert_eq!(failure.provider, Some(ProviderKind::Deepl));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<String> = (0..6).map(|i| format!("ep{}.srt", i)).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        write_subs(dir.path(), &refs);

        let primary = MockTranslator::new(ProviderKind::Deepl)
            .with_delay(Duration::from_millis(30))
            .shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary.clone(), secondary, UsageSnapshot::characters(0, 500_000));

        let jobs = dispatcher.jobs_from_dir(dir.path(), "en", "fr").unwrap();
        let report = dispatcher.run(jobs, 2).await;

        assert_eq!(report.succeeded(), 6);
        assert_eq!(primary.call_count(), 6);
        assert_eq!(primary.peak_concurrency(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_immediately() {
        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary, secondary, UsageSnapshot::characters(0, 500_000));

        let jobs = vec![TranslationJob::new("x.fr.srt", "en", "fr")];
        let report = dispatcher.run(jobs, 4).await;
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_unreadable_dir_is_fatal() {
        let primary = MockTranslator::new(ProviderKind::Deepl).shared();
        let secondary = MockTranslator::new(ProviderKind::Google).shared();
        let dispatcher = dispatcher(primary, secondary, UsageSnapshot::default());

        let result = dispatcher.jobs_from_dir(Path::new("/no/such/dir"), "en", "fr");
        assert!(result.is_err());
    }
}
