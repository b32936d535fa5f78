// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{ComparisonMode, HashAlgorithm};

/// Configuration as read from disk, before validation.
///
/// Mirrors the JSON config:
///
/// ```json
/// {
///   "file_extensions": [".txt", "pdf"],
///   "scan_paths": ["/data/inbox"],
///   "output_dir": "/data/out",
///   "history_store_path": "/data/history.json",
///   "calculate_md5_hash": true
/// }
/// ```
///
/// `concurrency`, `hash_algorithm` and `copy_changed` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub file_extensions: Vec<String>,

    #[serde(default)]
    pub scan_paths: Vec<PathBuf>,

    /// A single directory or a list of directories.
    #[serde(default)]
    pub output_dir: OutputDirs,

    pub history_store_path: PathBuf,

    #[serde(default)]
    pub calculate_md5_hash: bool,

    /// Maximum number of files fingerprinted at once within one scan root.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Copy changed files into `output_dir`.
    #[serde(default = "default_copy_changed")]
    pub copy_changed: bool,
}

fn default_concurrency() -> usize {
    16
}

fn default_copy_changed() -> bool {
    true
}

/// `output_dir` as written in the config: either `"dir"` or `["a", "b"]`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(untagged)]
pub enum OutputDirs {
    #[default]
    None,
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl OutputDirs {
    pub fn into_vec(self) -> Vec<PathBuf> {
        match self {
            OutputDirs::None => Vec::new(),
            OutputDirs::One(dir) => vec![dir],
            OutputDirs::Many(dirs) => dirs,
        }
    }
}

/// Validated configuration consumed read-only by the engine.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so extensions are always normalized (lowercase, no leading dot).
#[derive(Debug, Clone)]
pub struct Config {
    file_extensions: Vec<String>,
    scan_paths: Vec<PathBuf>,
    output_dirs: Vec<PathBuf>,
    history_store_path: PathBuf,
    mode: ComparisonMode,
    hash_algorithm: HashAlgorithm,
    concurrency: usize,
    copy_changed: bool,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_unchecked(
        file_extensions: Vec<String>,
        scan_paths: Vec<PathBuf>,
        output_dirs: Vec<PathBuf>,
        history_store_path: PathBuf,
        mode: ComparisonMode,
        hash_algorithm: HashAlgorithm,
        concurrency: usize,
        copy_changed: bool,
    ) -> Self {
        Self {
            file_extensions,
            scan_paths,
            output_dirs,
            history_store_path,
            mode,
            hash_algorithm,
            concurrency,
            copy_changed,
        }
    }

    /// Normalized extensions; empty matches no file.
    pub fn file_extensions(&self) -> &[String] {
        &self.file_extensions
    }

    /// Watch roots, in the order they are scanned.
    pub fn scan_paths(&self) -> &[PathBuf] {
        &self.scan_paths
    }

    pub fn output_dirs(&self) -> &[PathBuf] {
        &self.output_dirs
    }

    pub fn history_store_path(&self) -> &PathBuf {
        &self.history_store_path
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Whether changed files should be copied to the output directories.
    pub fn copy_enabled(&self) -> bool {
        self.copy_changed && !self.output_dirs.is_empty()
    }

    /// Override the per-root concurrency bound (e.g. from `--concurrency`).
    ///
    /// Values below 1 are clamped to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Disable the copy step regardless of `copy_changed`.
    pub fn without_copy(mut self) -> Self {
        self.copy_changed = false;
        self
    }
}
