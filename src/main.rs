//! Main entry point for the subtitle translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subtitle_translator::cli::commands::{self, Commands};
use subtitle_translator::TranslatorConfig;

/// Subtitle Translator - DeepL with Google fallback for .srt files
#[derive(Parser, Debug)]
#[command(name = "subtitle-translator", version, about, long_about = None)]
struct Args {
    /// JSON configuration file (defaults to env vars and credential files)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("subtitle_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!("Logging started");

    let config = match &args.config {
        Some(path) => {
            let mut config = TranslatorConfig::from_file(path)?;
            config.fill_from_credentials()?;
            config
        }
        None => TranslatorConfig::load()?,
    };

    // Execute command
    match args.command {
        Some(Commands::Srt {
            dir,
            source_lang,
            target_lang,
            max_concurrent,
        }) => {
            commands::handle_srt(config, dir, source_lang, target_lang, max_concurrent).await?;
        }
        Some(Commands::Usage) => {
            commands::handle_usage(config).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    debug!("Logging ended");
    Ok(())
}
