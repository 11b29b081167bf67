//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::core::config::TranslatorConfig;
use crate::core::dispatcher::JobDispatcher;
use crate::core::models::format_elapsed;
use crate::core::quota::QuotaGate;
use crate::providers::deepl::DeeplClient;
use crate::providers::google::GoogleClient;
use crate::providers::http_client;

/// Commands for the subtitle translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate every .srt file in a directory
    Srt {
        /// Directory containing the subtitle files
        #[arg(short, long)]
        dir: PathBuf,

        /// Source language code (e.g. en, ch)
        #[arg(short, long)]
        source_lang: String,

        /// Target language code (e.g. fr, ch)
        #[arg(short, long)]
        target_lang: String,

        /// Maximum number of files translated at a time
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Show the DeepL usage report
    Usage,
}

/// Build the dispatcher for one language pair from the configuration
pub fn build_dispatcher(
    config: &TranslatorConfig,
    source_lang: &str,
    target_lang: &str,
) -> anyhow::Result<JobDispatcher> {
    config.validate()?;

    let client = http_client(config.timeout_ms)?;
    let deepl = Arc::new(DeeplClient::new(config, client.clone(), source_lang, target_lang));
    let google = Arc::new(GoogleClient::new(config, client, source_lang, target_lang));
    let gate = QuotaGate::new(deepl.clone(), config.usage_margin);

    Ok(JobDispatcher::new(deepl, google, gate))
}

/// Handle subtitle translation command
pub async fn handle_srt(
    config: TranslatorConfig,
    dir: PathBuf,
    source_lang: String,
    target_lang: String,
    max_concurrent: Option<usize>,
) -> anyhow::Result<()> {
    if source_lang.trim().is_empty() || target_lang.trim().is_empty() {
        anyhow::bail!("Source and target languages should be provided!");
    }
    let max_concurrent = max_concurrent.unwrap_or(config.max_concurrent);

    info!("Starting subtitle translation");
    info!("Input: {}", dir.display());
    info!("Languages: {} -> {}", source_lang, target_lang);
    info!("Max concurrent: {}", max_concurrent);

    let dispatcher = build_dispatcher(&config, &source_lang, &target_lang)?;
    let jobs = dispatcher.jobs_from_dir(&dir, &source_lang, &target_lang)?;
    let pending = jobs.iter().filter(|j| !j.is_translated_output()).count();

    // Create progress bar
    let pb = ProgressBar::new(pending as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
        .progress_chars("=>-"));

    let report = dispatcher.with_progress(pb.clone()).run(jobs, max_concurrent).await;
    pb.finish_with_message("Completed");

    println!("\n✅ Translation completed!");
    println!("   Processed: {}", report.succeeded());
    println!("   Failed: {}", report.failed());
    println!("   Time: {}", format_elapsed(report.elapsed));

    for failure in report.failures() {
        eprintln!(
            "Error processing {}: {}",
            failure.job.source_file.display(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Handle usage command
pub async fn handle_usage(config: TranslatorConfig) -> anyhow::Result<()> {
    let client = http_client(config.timeout_ms)?;
    let deepl = Arc::new(DeeplClient::new(&config, client, "en", "en"));
    let gate = QuotaGate::new(deepl, config.usage_margin);

    gate.report_usage().await;
    match gate.check().await {
        Ok(true) => println!("DeepL quota available"),
        Ok(false) => println!("DeepL unavailable or quota exhausted; Google will be used"),
        Err(e) => println!("DeepL usage unknown ({}); Google will be used", e),
    }

    Ok(())
}
