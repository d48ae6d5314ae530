//! Progress Store - persisted record of generated and failed words
//!
//! The whole record is rewritten after every mutation, so a crash loses at
//! most the in-flight word and a later run resumes at the first word that
//! is not yet done. A missing or unreadable file means "no prior progress",
//! never a fatal error. Exactly one process owns the file for a run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One successfully generated word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedEntry {
    pub path: PathBuf,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

/// One terminal failure. The list is append-only; a word may appear more
/// than once across resumed runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedEntry {
    pub word: String,
    pub category: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// The persisted progress state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub generated: BTreeMap<String, GeneratedEntry>,
    #[serde(default)]
    pub failed: Vec<FailedEntry>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub categories_completed: Vec<String>,
}

/// Owns the progress record and its backing file.
pub struct ProgressStore {
    path: PathBuf,
    record: ProgressRecord,
}

impl ProgressStore {
    /// Load prior progress, or start fresh if the file is missing or
    /// unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        "ignoring unreadable progress file {}: {}",
                        path.display(),
                        e
                    );
                    ProgressRecord::default()
                }
            },
            Err(_) => ProgressRecord::default(),
        };
        Self { path, record }
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    /// True iff the word has already been generated.
    pub fn is_done(&self, word: &str) -> bool {
        self.record.generated.contains_key(word)
    }

    pub fn generated_count(&self) -> usize {
        self.record.generated.len()
    }

    /// Record a generated word and persist immediately.
    pub fn record_success(&mut self, word: &str, path: &Path, category: &str) -> Result<()> {
        self.record.generated.insert(
            word.to_string(),
            GeneratedEntry {
                path: path.to_path_buf(),
                category: category.to_string(),
                timestamp: Utc::now(),
            },
        );
        self.record.total_count += 1;
        self.save()
    }

    /// Append a terminal failure and persist immediately.
    pub fn record_failure(&mut self, word: &str, category: &str, reason: &str) -> Result<()> {
        self.record.failed.push(FailedEntry {
            word: word.to_string(),
            category: category.to_string(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
        self.save()
    }

    /// Record that a category finished a run without terminal failures.
    pub fn mark_category_complete(&mut self, name: &str) -> Result<()> {
        if !self.record.categories_completed.iter().any(|c| c == name) {
            self.record.categories_completed.push(name.to_string());
            self.save()?;
        }
        Ok(())
    }

    /// Rewrite the whole record. Writes go through a temp file in the same
    /// directory and a rename, so the file is never half-written.
    pub fn save(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let json = serde_json::to_string_pretty(&self.record)
            .context("failed to serialize progress record")?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        tmp.write_all(json.as_bytes())
            .context("failed to write progress record")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
