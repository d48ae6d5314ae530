//! flashgen CLI - batch flashcard image generation
//!
//! Subcommands:
//! 1. `generate` runs the batch pipeline against a vocabulary document
//! 2. `status` reports totals from the progress file
//! 3. `categories` lists what a document would parse into
//!
//! Ctrl-C is a pause, not an error: progress is already persisted per
//! word, so the next run resumes automatically.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use flashgen::assets::OutputWriter;
use flashgen::imagen::ImagenClient;
use flashgen::pipeline::{run_batch, BatchConfig};
use flashgen::progress::ProgressStore;
use flashgen::vocab::{parse_vocabulary, VocabCategory};

/// How many failure entries the console summary shows before truncating.
const FAILURE_DISPLAY_LIMIT: usize = 5;

/// Batch generator for toddler flashcard images
#[derive(Parser)]
#[command(name = "flashgen")]
#[command(about = "Generates flashcard illustration assets from a vocabulary list")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images for every word in the vocabulary document
    Generate {
        /// Path to the vocabulary markdown file
        vocab_file: PathBuf,

        /// Only generate these categories (exact names)
        #[arg(long, num_args = 1..)]
        categories: Option<Vec<String>>,

        /// Google API key (defaults to the GOOGLE_API_KEY environment variable)
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Directory for the flat per-category image tree
        #[arg(long, default_value = "GeneratedImages")]
        images_dir: PathBuf,

        /// Directory for the Xcode imageset bundles
        #[arg(long, default_value = "Assets.xcassets/FlashcardImages")]
        assets_dir: PathBuf,

        /// Progress file location
        #[arg(long, default_value = "image_generation_log.json")]
        progress_file: PathBuf,

        /// Attempts per word before recording a failure (default: 3)
        #[arg(long, default_value = "3")]
        max_retries: u32,

        /// Delay between words in milliseconds (default: 1000)
        #[arg(long, default_value = "1000")]
        request_delay_ms: u64,

        /// Backoff between retries in milliseconds (default: 2000)
        #[arg(long, default_value = "2000")]
        retry_backoff_ms: u64,
    },

    /// Show totals and recent failures from the progress file
    Status {
        /// Progress file location
        #[arg(long, default_value = "image_generation_log.json")]
        progress_file: PathBuf,
    },

    /// List the categories found in a vocabulary document
    Categories {
        /// Path to the vocabulary markdown file
        vocab_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("flashgen=debug,info")
    } else {
        EnvFilter::new("flashgen=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Generate {
            vocab_file,
            categories,
            api_key,
            images_dir,
            assets_dir,
            progress_file,
            max_retries,
            request_delay_ms,
            retry_backoff_ms,
        } => {
            let config = BatchConfig {
                max_retries,
                retry_backoff: Duration::from_millis(retry_backoff_ms),
                request_delay: Duration::from_millis(request_delay_ms),
                categories,
            };
            generate(
                &vocab_file,
                api_key,
                &images_dir,
                &assets_dir,
                &progress_file,
                config,
            )
            .await?;
        }
        Commands::Status { progress_file } => {
            show_status(&progress_file);
        }
        Commands::Categories { vocab_file } => {
            list_categories(&vocab_file)?;
        }
    }

    Ok(())
}

/// Run the batch pipeline for one vocabulary document.
async fn generate(
    vocab_file: &Path,
    api_key: String,
    images_dir: &Path,
    assets_dir: &Path,
    progress_file: &Path,
    config: BatchConfig,
) -> Result<()> {
    let text = std::fs::read_to_string(vocab_file)
        .with_context(|| format!("failed to read {}", vocab_file.display()))?;
    let categories = parse_vocabulary(&text);

    let mut store = ProgressStore::load(progress_file);
    let writer = OutputWriter::new(images_dir, assets_dir);
    let client = ImagenClient::new(api_key).context("failed to build HTTP client")?;

    print_statistics(&categories, &config, &store);

    // Ctrl-C pauses: stop issuing requests, keep what is already recorded.
    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, finishing current word");
                interrupt.store(true, Ordering::SeqCst);
            }
        });
    }

    let summary = run_batch(
        &client,
        &mut store,
        &writer,
        &categories,
        &config,
        &interrupt,
    )
    .await?;

    println!("\n========================================");
    if summary.interrupted {
        println!("  GENERATION PAUSED");
    } else {
        println!("  GENERATION COMPLETE");
    }
    println!("========================================");
    println!("  Generated this run: {}", summary.generated);
    println!("  Skipped (already done): {}", summary.skipped);
    println!("  Failed this run: {}", summary.failed);
    println!("  Total generated: {}", store.record().total_count);
    println!("  Images: {}", images_dir.display());
    println!("  Assets: {}", assets_dir.display());
    println!("========================================");

    print_failures(&store);

    if summary.interrupted {
        println!("\nProgress saved. Run again to resume from where you left off.");
    }

    Ok(())
}

/// Pre-run statistics block.
fn print_statistics(categories: &[VocabCategory], config: &BatchConfig, store: &ProgressStore) {
    let selected: Vec<_> = categories
        .iter()
        .filter(|c| match &config.categories {
            Some(allow) => allow.iter().any(|a| a == &c.name),
            None => true,
        })
        .collect();
    let total_words: usize = selected.iter().map(|c| c.words.len()).sum();
    let already_done = selected
        .iter()
        .flat_map(|c| c.words.iter())
        .filter(|w| store.is_done(w))
        .count();

    println!("\n========================================");
    println!("  FLASHGEN BATCH RUN");
    println!("========================================");
    println!("  Categories: {}", selected.len());
    println!("  Total words: {}", total_words);
    println!("  Already generated: {}", already_done);
    println!("  Remaining: {}", total_words - already_done);
    println!("  Max retries per word: {}", config.max_retries);
    println!("========================================\n");
}

/// Truncated failure list, oldest first.
fn print_failures(store: &ProgressStore) {
    let failed = &store.record().failed;
    if failed.is_empty() {
        return;
    }

    println!("\nFailed words ({}):", failed.len());
    for entry in failed.iter().take(FAILURE_DISPLAY_LIMIT) {
        println!("  - {} ({}): {}", entry.word, entry.category, entry.reason);
    }
    if failed.len() > FAILURE_DISPLAY_LIMIT {
        println!("  ... and {} more", failed.len() - FAILURE_DISPLAY_LIMIT);
    }
}

/// Report totals from the progress file.
fn show_status(progress_file: &Path) {
    let store = ProgressStore::load(progress_file);
    let record = store.record();

    println!("\n========================================");
    println!("  GENERATION PROGRESS");
    println!("========================================");
    println!("  Generated words: {}", record.generated.len());
    println!("  Total recorded: {}", record.total_count);
    println!("  Failures logged: {}", record.failed.len());
    println!(
        "  Categories completed: {}",
        record.categories_completed.len()
    );
    println!("========================================");

    print_failures(&store);
}

/// List parsed categories with word counts.
fn list_categories(vocab_file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(vocab_file)
        .with_context(|| format!("failed to read {}", vocab_file.display()))?;
    let categories = parse_vocabulary(&text);

    if categories.is_empty() {
        println!("No categories found in {}", vocab_file.display());
        return Ok(());
    }

    println!("\nCategories in {}:\n", vocab_file.display());
    for category in &categories {
        println!("  {} ({} words)", category.name, category.words.len());
    }
    println!();

    Ok(())
}
