//! Batch Orchestrator - the sequential generate loop
//!
//! One word is fully resolved, retries included, before the next begins.
//! The store is consulted before each call (skip-if-done) and updated
//! after every attempt, so an interrupted run resumes at the first word
//! that is not yet done.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::assets::OutputWriter;
use crate::imagen::ImageGenerator;
use crate::progress::ProgressStore;
use crate::prompt::build_prompt;
use crate::vocab::VocabCategory;

/// Pacing and retry knobs for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Attempts per word before the failure becomes terminal.
    pub max_retries: u32,
    /// Fixed wait between attempts for the same word.
    pub retry_backoff: Duration,
    /// Fixed wait after every attempted word, success or not.
    pub request_delay: Duration,
    /// Optional category allow-list (exact names).
    pub categories: Option<Vec<String>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_secs(2),
            request_delay: Duration::from_secs(1),
            categories: None,
        }
    }
}

/// Counters for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

enum WordOutcome {
    Done,
    Failed,
}

/// Walk every category and word in document order, generating whatever the
/// store does not already have. Returns early, with `interrupted` set, when
/// the flag goes up; everything recorded so far is already persisted.
pub async fn run_batch(
    client: &dyn ImageGenerator,
    store: &mut ProgressStore,
    writer: &OutputWriter,
    categories: &[VocabCategory],
    config: &BatchConfig,
    interrupt: &AtomicBool,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    let selected = categories.iter().filter(|c| match &config.categories {
        Some(allow) => allow.iter().any(|a| a == &c.name),
        None => true,
    });

    for category in selected {
        tracing::info!(
            "category '{}': {} words",
            category.name,
            category.words.len()
        );

        let mut attempted = 0usize;
        let mut terminal_failures = 0usize;

        for word in &category.words {
            if interrupt.load(Ordering::SeqCst) {
                summary.interrupted = true;
                return Ok(summary);
            }

            if store.is_done(word) {
                tracing::debug!("skipping '{}', already generated", word);
                summary.skipped += 1;
                continue;
            }

            attempted += 1;
            match generate_one(client, store, writer, word, &category.name, config).await {
                WordOutcome::Done => summary.generated += 1,
                WordOutcome::Failed => {
                    summary.failed += 1;
                    terminal_failures += 1;
                }
            }

            tokio::time::sleep(config.request_delay).await;
        }

        if attempted > 0 && terminal_failures == 0 {
            if let Err(e) = store.mark_category_complete(&category.name) {
                tracing::warn!("could not persist category completion: {e:#}");
            }
        }
    }

    Ok(summary)
}

/// Resolve a single word: bounded retry around the client, then dual-write
/// and record. Write failures are terminal for the word, never the batch.
async fn generate_one(
    client: &dyn ImageGenerator,
    store: &mut ProgressStore,
    writer: &OutputWriter,
    word: &str,
    category: &str,
    config: &BatchConfig,
) -> WordOutcome {
    let prompt = build_prompt(word, category);
    let mut last_error = String::new();

    for attempt in 1..=config.max_retries {
        tracing::info!("generating '{}' (attempt {}/{})", word, attempt, config.max_retries);

        let image = match client.generate(&prompt, word).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("generation failed for '{}': {}", word, e);
                last_error = e.to_string();
                if attempt < config.max_retries {
                    tokio::time::sleep(config.retry_backoff).await;
                }
                continue;
            }
        };

        return match writer.write(&image, word, category) {
            Ok(path) => {
                if let Err(e) = store.record_success(word, &path, category) {
                    tracing::warn!("could not persist progress for '{}': {e:#}", word);
                }
                tracing::info!("saved '{}' -> {}", word, path.display());
                WordOutcome::Done
            }
            Err(e) => {
                tracing::error!("could not write output for '{}': {e:#}", word);
                record_terminal_failure(store, word, category, &format!("{e:#}"));
                WordOutcome::Failed
            }
        };
    }

    record_terminal_failure(store, word, category, &last_error);
    WordOutcome::Failed
}

fn record_terminal_failure(store: &mut ProgressStore, word: &str, category: &str, reason: &str) {
    if let Err(e) = store.record_failure(word, category, reason) {
        tracing::warn!("could not persist failure for '{}': {e:#}", word);
    }
}
