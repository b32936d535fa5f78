// src/engine/runtime.rs

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::history::HistoryStore;
use crate::output::{ChangeSink, CopyToOutput, DetectOnly};
use crate::scan::{ExcludedPaths, ExtensionMatcher, ScanPipeline};

use super::RunSummary;

/// Drives one run: every watch root, in order, through the scan pipeline.
#[derive(Debug)]
pub struct Engine {
    config: Config,
    store: Arc<HistoryStore>,
    matcher: ExtensionMatcher,
    excluded: ExcludedPaths,
    pipeline: ScanPipeline,
}

impl Engine {
    /// Build an engine, loading the history store.
    ///
    /// Fails if the history file exists but cannot be parsed.
    pub fn new(config: Config, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let sink: Arc<dyn ChangeSink> = if config.copy_enabled() {
            Arc::new(CopyToOutput::new(
                Arc::clone(&fs),
                config.output_dirs().to_vec(),
            ))
        } else {
            Arc::new(DetectOnly)
        };
        Self::with_sink(config, fs, sink)
    }

    /// Like [`Engine::new`] but with a caller-provided change sink.
    pub fn with_sink(
        config: Config,
        fs: Arc<dyn FileSystem>,
        sink: Arc<dyn ChangeSink>,
    ) -> Result<Self> {
        let store = Arc::new(HistoryStore::open(
            Arc::clone(&fs),
            config.history_store_path().clone(),
        )?);
        let matcher = ExtensionMatcher::new(config.file_extensions())?;
        if matcher.is_empty() {
            warn!("no file extensions configured, nothing will be scanned");
        }
        // The store may live inside a watch root; it must never be a candidate.
        let excluded = ExcludedPaths::for_history_store(fs.as_ref(), store.path());
        let pipeline = ScanPipeline::new(fs, Arc::clone(&store), sink, &config);

        Ok(Self {
            config,
            store,
            matcher,
            excluded,
            pipeline,
        })
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> Result<RunSummary> {
        info!(
            roots = self.config.scan_paths().len(),
            mode = ?self.config.mode(),
            concurrency = self.pipeline.concurrency(),
            "deltascan run started"
        );

        let mut summary = RunSummary::default();
        for root in self.config.scan_paths() {
            let report = self
                .pipeline
                .scan_root(root, &self.matcher, &self.excluded)
                .await;
            let tally = report.tally();
            info!(
                root = ?root,
                changed = tally.changed,
                unchanged = tally.unchanged,
                errors = tally.errors,
                "root finished"
            );
            summary.roots.push(report);
        }

        let totals = summary.totals();
        info!(
            changed = totals.changed,
            unchanged = totals.unchanged,
            errors = totals.errors,
            "deltascan run complete"
        );
        Ok(summary)
    }
}
