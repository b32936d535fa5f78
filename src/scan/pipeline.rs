// src/scan/pipeline.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fingerprint::evaluate;
use crate::fs::FileSystem;
use crate::history::HistoryStore;
use crate::output::ChangeSink;
use crate::scan::discover::{discover_files, ExcludedPaths, ExtensionMatcher};
use crate::scan::{FileOutcome, FileResult, ScanReport};
use crate::types::{ComparisonMode, HashAlgorithm};

/// Fingerprints every candidate file of one watch root.
///
/// Files are processed concurrently, with at most `concurrency` of them in
/// flight. A failure on one file is classified as [`FileOutcome::Error`] and
/// never affects its siblings.
#[derive(Debug, Clone)]
pub struct ScanPipeline {
    job: FileJob,
    concurrency: usize,
}

/// Everything a single file needs; cheap to clone into a task.
#[derive(Debug, Clone)]
struct FileJob {
    fs: Arc<dyn FileSystem>,
    store: Arc<HistoryStore>,
    sink: Arc<dyn ChangeSink>,
    mode: ComparisonMode,
    algorithm: HashAlgorithm,
}

impl ScanPipeline {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        store: Arc<HistoryStore>,
        sink: Arc<dyn ChangeSink>,
        config: &Config,
    ) -> Self {
        Self {
            job: FileJob {
                fs,
                store,
                sink,
                mode: config.mode(),
                algorithm: config.hash_algorithm(),
            },
            concurrency: config.concurrency().max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Discover the candidate files under `root` and process them all.
    ///
    /// If the root itself cannot be walked, the report carries no file results
    /// and `root_error` is set.
    pub async fn scan_root(
        &self,
        root: &Path,
        matcher: &ExtensionMatcher,
        excluded: &ExcludedPaths,
    ) -> ScanReport {
        let discovered = {
            let fs = Arc::clone(&self.job.fs);
            let root = root.to_path_buf();
            let matcher = matcher.clone();
            let excluded = excluded.clone();
            tokio::task::spawn_blocking(move || {
                discover_files(fs.as_ref(), &root, &matcher, &excluded)
            })
            .await
        };

        let paths = match discovered {
            Ok(Ok(paths)) => paths,
            Ok(Err(err)) => {
                warn!(root = ?root, error = %format!("{err:#}"), "cannot scan root");
                return ScanReport::failed_root(root, format!("{err:#}"));
            }
            Err(err) => {
                warn!(root = ?root, error = %err, "directory walk panicked");
                return ScanReport::failed_root(root, err.to_string());
            }
        };

        info!(root = ?root, files = paths.len(), "scanning root");
        let mut report = self.process_all(paths).await;
        report.root = root.to_path_buf();
        report
    }

    /// Process an explicit list of candidate paths.
    pub async fn process_all(&self, paths: Vec<PathBuf>) -> ScanReport {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            // Waiting here, before the spawn, keeps the number of live tasks
            // bounded as well as the number of open files.
            let permit = match Arc::clone(&permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    results.push(FileResult::new(path, FileOutcome::Error));
                    continue;
                }
            };
            let job = self.job.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = job.process_file(&path).await;
                FileResult::new(path, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => {
                    // The path is lost with the task; count it all the same.
                    warn!(error = %err, "file task failed to complete");
                    results.push(FileResult::new(PathBuf::new(), FileOutcome::Error));
                }
            }
        }

        results.sort_by(|a, b| a.path.cmp(&b.path));
        ScanReport::new(PathBuf::new(), results)
    }
}

impl FileJob {
    async fn process_file(&self, path: &Path) -> FileOutcome {
        debug!(file = ?path, "processing");

        let eval = match evaluate(
            Arc::clone(&self.fs),
            &self.store,
            path,
            self.mode,
            self.algorithm,
        )
        .await
        {
            Ok(eval) => eval,
            Err(err) => {
                warn!(file = ?path, error = %format!("{err:#}"), "cannot fingerprint file");
                return FileOutcome::Error;
            }
        };

        if !eval.changed {
            debug!(file = ?path, "File has not changed since it was last copied");
            return FileOutcome::Unchanged;
        }

        let delivered = {
            let sink = Arc::clone(&self.sink);
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || sink.deliver(&path)).await
        };
        match delivered {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                warn!(file = ?path, error = %format!("{err:#}"), "failed to deliver changed file");
                return FileOutcome::Error;
            }
            Err(err) => {
                warn!(file = ?path, error = %err, "delivery task panicked");
                return FileOutcome::Error;
            }
        }

        let stored = {
            let store = Arc::clone(&self.store);
            let record = eval.current;
            tokio::task::spawn_blocking(move || store.set(record)).await
        };
        match stored {
            Ok(Ok(())) => {
                info!(file = ?path, "file changed");
                FileOutcome::Changed
            }
            Ok(Err(err)) => {
                warn!(
                    file = ?path,
                    error = %err,
                    "file delivered, but history file could not be updated"
                );
                FileOutcome::Error
            }
            Err(err) => {
                warn!(file = ?path, error = %err, "history update panicked");
                FileOutcome::Error
            }
        }
    }
}
