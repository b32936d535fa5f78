// src/fingerprint/policy.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::fingerprint::hash::compute_file_hash;
use crate::fs::FileSystem;
use crate::history::{FingerprintRecord, HistoryStore};
use crate::types::{ComparisonMode, HashAlgorithm};

/// Freshly observed state of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// `None` in timestamp mode.
    pub content_hash: Option<String>,
    pub modified_time: Option<i64>,
}

impl Observation {
    pub fn into_record(self, file_path: impl Into<PathBuf>) -> FingerprintRecord {
        FingerprintRecord::new(file_path, self.content_hash, self.modified_time)
    }
}

/// Result of comparing one file against its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub changed: bool,
    /// The record as it was before this file was processed.
    pub previous: FingerprintRecord,
    /// The record to store if the change is accepted.
    pub current: FingerprintRecord,
}

/// Compare a stored fingerprint with a fresh observation.
///
/// Anything unknown on either side counts as changed, so a path the store has
/// never seen is always reported.
pub fn has_changed(
    historic: &FingerprintRecord,
    observed: &Observation,
    mode: ComparisonMode,
) -> bool {
    match mode {
        ComparisonMode::Hash => match (&historic.content_hash, &observed.content_hash) {
            (Some(old), Some(new)) => old != new,
            _ => true,
        },
        ComparisonMode::Timestamp => match (historic.modified_time, observed.modified_time) {
            (Some(old), Some(new)) => old != new,
            _ => true,
        },
    }
}

/// Hash (in hash mode) and stat `path`, with both running at once.
pub async fn observe(
    fs: Arc<dyn FileSystem>,
    path: &Path,
    mode: ComparisonMode,
    algorithm: HashAlgorithm,
) -> Result<Observation> {
    let hash_task = {
        let fs = Arc::clone(&fs);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || match mode {
            ComparisonMode::Hash => compute_file_hash(fs.as_ref(), &path, algorithm).map(Some),
            ComparisonMode::Timestamp => Ok(None),
        })
    };
    let stat_task = {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || fs.modified_millis(&path))
    };

    let (hash, mtime) = tokio::join!(hash_task, stat_task);
    let content_hash = hash.context("hash task panicked")??;
    let modified_time = mtime.context("stat task panicked")??;

    Ok(Observation {
        content_hash,
        modified_time,
    })
}

/// Decide whether `path` changed since it was last recorded.
///
/// The historic record is read before the file is observed, so the
/// comparison is always against the fingerprint that existed when this
/// file's processing started. The store is not touched here.
pub async fn evaluate(
    fs: Arc<dyn FileSystem>,
    store: &HistoryStore,
    path: &Path,
    mode: ComparisonMode,
    algorithm: HashAlgorithm,
) -> Result<Evaluation> {
    let previous = store.get(path);
    let observed = observe(fs, path, mode, algorithm).await?;

    let changed = has_changed(&previous, &observed, mode);
    match mode {
        ComparisonMode::Hash => debug!(
            file = ?path,
            old = previous.content_hash.as_deref().unwrap_or("-"),
            new = observed.content_hash.as_deref().unwrap_or("-"),
            changed,
            "compared content hash"
        ),
        ComparisonMode::Timestamp => debug!(
            file = ?path,
            old = ?previous.modified_time,
            new = ?observed.modified_time,
            changed,
            "compared modification time"
        ),
    }

    Ok(Evaluation {
        changed,
        current: observed.into_record(path),
        previous,
    })
}
