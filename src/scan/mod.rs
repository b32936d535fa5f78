// src/scan/mod.rs

//! Scanning one watch root: discover candidate files, fingerprint them
//! concurrently, record changes and classify every file.

use std::ops::AddAssign;
use std::path::PathBuf;

pub mod discover;
pub mod pipeline;

pub use discover::{discover_files, ExcludedPaths, ExtensionMatcher};
pub use pipeline::ScanPipeline;

/// Classification of one processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Differs from its history; delivered and recorded.
    Changed,
    /// Matches its history; nothing was written.
    Unchanged,
    /// Reading, delivering or recording failed.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileResult {
    pub fn new(path: PathBuf, outcome: FileOutcome) -> Self {
        Self { path, outcome }
    }
}

/// Counts of file outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanTally {
    pub changed: usize,
    pub unchanged: usize,
    pub errors: usize,
}

impl ScanTally {
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Changed => self.changed += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Error => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.errors
    }
}

impl AddAssign for ScanTally {
    fn add_assign(&mut self, rhs: Self) {
        self.changed += rhs.changed;
        self.unchanged += rhs.unchanged;
        self.errors += rhs.errors;
    }
}

/// Result of scanning one watch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub root: PathBuf,
    /// Per-file results, sorted by path.
    pub files: Vec<FileResult>,
    /// Set when the root could not be walked at all.
    pub root_error: Option<String>,
}

impl ScanReport {
    pub fn new(root: PathBuf, files: Vec<FileResult>) -> Self {
        Self {
            root,
            files,
            root_error: None,
        }
    }

    pub fn failed_root(root: &std::path::Path, reason: String) -> Self {
        Self {
            root: root.to_path_buf(),
            files: Vec::new(),
            root_error: Some(reason),
        }
    }

    /// Outcome counts; an unwalkable root counts as one error.
    pub fn tally(&self) -> ScanTally {
        let mut tally = ScanTally::default();
        for file in &self.files {
            tally.record(file.outcome);
        }
        if self.root_error.is_some() {
            tally.errors += 1;
        }
        tally
    }

    pub fn outcome_of(&self, path: &std::path::Path) -> Option<FileOutcome> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.outcome)
    }
}
