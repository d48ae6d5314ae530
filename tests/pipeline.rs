//! End-to-end pipeline tests: parse a document, run the batch against a
//! deterministic generator, then run again from the reloaded progress
//! file to prove resumability without further client calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use flashgen::assets::OutputWriter;
use flashgen::imagen::{GenerateError, ImageGenerator};
use flashgen::pipeline::{run_batch, BatchConfig};
use flashgen::progress::ProgressStore;
use flashgen::vocab::parse_vocabulary;

const VOCAB_DOC: &str = "\
## Colors
red, blue

## Animals & Creatures
cat

## Complete word list
red, blue, cat
";

struct CountingGenerator {
    calls: AtomicUsize,
}

impl CountingGenerator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &str, _word: &str) -> Result<Vec<u8>, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(b"png-bytes".to_vec())
    }
}

fn fast_config() -> BatchConfig {
    BatchConfig {
        max_retries: 3,
        retry_backoff: Duration::ZERO,
        request_delay: Duration::ZERO,
        categories: None,
    }
}

#[tokio::test]
async fn full_run_then_resume_makes_no_further_calls() {
    let temp = TempDir::new().unwrap();
    let progress_path = temp.path().join("progress.json");
    let categories = parse_vocabulary(VOCAB_DOC);
    assert_eq!(categories.len(), 2);

    let writer = OutputWriter::new(temp.path().join("images"), temp.path().join("assets"));
    let stub = CountingGenerator::new();
    let interrupt = AtomicBool::new(false);

    // First run generates everything.
    let mut store = ProgressStore::load(&progress_path);
    let summary = run_batch(&stub, &mut store, &writer, &categories, &fast_config(), &interrupt)
        .await
        .unwrap();

    assert_eq!(summary.generated, 3);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    assert!(temp.path().join("images/colors/red.png").exists());
    assert!(temp.path().join("images/animals___creatures/cat.png").exists());
    assert!(temp.path().join("assets/cat.imageset/cat.png").exists());
    assert!(temp.path().join("assets/cat.imageset/Contents.json").exists());

    // Second run loads the persisted record fresh, as a new process would.
    let mut resumed = ProgressStore::load(&progress_path);
    assert_eq!(resumed.generated_count(), 3);

    let summary = run_batch(
        &stub,
        &mut resumed,
        &writer,
        &categories,
        &fast_config(),
        &interrupt,
    )
    .await
    .unwrap();

    assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    assert_eq!(summary.generated, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(resumed.record().total_count, 3);
}

#[tokio::test]
async fn progress_file_matches_documented_shape() {
    let temp = TempDir::new().unwrap();
    let progress_path = temp.path().join("progress.json");
    let categories = parse_vocabulary("## Colors\nred\n");

    let writer = OutputWriter::new(temp.path().join("images"), temp.path().join("assets"));
    let stub = CountingGenerator::new();
    let interrupt = AtomicBool::new(false);

    let mut store = ProgressStore::load(&progress_path);
    run_batch(&stub, &mut store, &writer, &categories, &fast_config(), &interrupt)
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&progress_path).unwrap()).unwrap();

    assert_eq!(json["total_count"], 1);
    assert_eq!(json["generated"]["red"]["category"], "Colors");
    assert!(json["generated"]["red"]["path"]
        .as_str()
        .unwrap()
        .ends_with("red.png"));
    assert!(json["generated"]["red"]["timestamp"].is_string());
    assert_eq!(json["failed"].as_array().unwrap().len(), 0);
    assert_eq!(json["categories_completed"][0], "Colors");
}
