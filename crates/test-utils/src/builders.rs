#![allow(dead_code)]

use std::path::{Path, PathBuf};

use deltascan::config::{Config, OutputDirs, RawConfigFile};
use deltascan::types::HashAlgorithm;

/// Builder for `Config` to simplify test setup.
///
/// Starts in hash mode with MD5, matching `.txt` files, no output
/// directories and a concurrency of 4.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new(history_store_path: impl AsRef<Path>) -> Self {
        Self {
            config: RawConfigFile {
                file_extensions: vec!["txt".to_string()],
                scan_paths: Vec::new(),
                output_dir: OutputDirs::None,
                history_store_path: history_store_path.as_ref().to_path_buf(),
                calculate_md5_hash: true,
                concurrency: 4,
                hash_algorithm: HashAlgorithm::Md5,
                copy_changed: true,
            },
        }
    }

    pub fn with_scan_path(mut self, root: impl AsRef<Path>) -> Self {
        self.config.scan_paths.push(root.as_ref().to_path_buf());
        self
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.config.file_extensions.push(ext.to_string());
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        self.config.output_dir = match std::mem::take(&mut self.config.output_dir) {
            OutputDirs::None => OutputDirs::One(dir),
            OutputDirs::One(first) => OutputDirs::Many(vec![first, dir]),
            OutputDirs::Many(mut dirs) => {
                dirs.push(dir);
                OutputDirs::Many(dirs)
            }
        };
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.calculate_md5_hash = val;
        self
    }

    pub fn hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.config.hash_algorithm = algorithm;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn copy_changed(mut self, val: bool) -> Self {
        self.config.copy_changed = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> Config {
        Config::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, content).expect("write test file");
    path
}
