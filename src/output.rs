// src/output.rs

//! What happens to a file once it has been classified as changed.
//!
//! The scan pipeline calls a [`ChangeSink`] before recording the new
//! fingerprint. If delivery fails the record is left alone, so the file is
//! picked up again on the next run.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};
use tracing::info;

use crate::fs::FileSystem;

pub trait ChangeSink: Send + Sync + Debug {
    /// Handle one changed file. Returns the paths written, if any.
    fn deliver(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Report-only sink: changed files are recorded but not copied.
#[derive(Debug, Clone, Default)]
pub struct DetectOnly;

impl ChangeSink for DetectOnly {
    fn deliver(&self, _path: &Path) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

/// Copies changed files into each output directory, keeping the base name
/// and picking `(Copy N) <name>` when the name is already taken.
///
/// Copies run in parallel. Only picking a name is serialized: the chosen
/// target stays reserved until its copy finishes, so two files sharing a base
/// name never pick the same target.
#[derive(Debug)]
pub struct CopyToOutput {
    fs: Arc<dyn FileSystem>,
    output_dirs: Vec<PathBuf>,
    reserved: Mutex<HashSet<PathBuf>>,
}

impl CopyToOutput {
    pub fn new(fs: Arc<dyn FileSystem>, output_dirs: Vec<PathBuf>) -> Self {
        Self {
            fs,
            output_dirs,
            reserved: Mutex::new(HashSet::new()),
        }
    }

    fn reserve(&self, dir: &Path, file_name: &str) -> PathBuf {
        let mut reserved = self.reserved.lock().unwrap_or_else(PoisonError::into_inner);
        let target = next_target(dir, file_name, |candidate| {
            reserved.contains(candidate) || self.fs.exists(candidate)
        });
        reserved.insert(target.clone());
        target
    }

    fn release(&self, target: &Path) {
        self.reserved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target);
    }

    fn copy_one(&self, path: &Path, dir: &Path, file_name: &str) -> Result<PathBuf> {
        self.fs.create_dir_all(dir)?;
        let target = self.reserve(dir, file_name);
        info!("Copying file: {:?} ==> {:?}", path, target);
        let copied = self.fs.copy(path, &target);
        self.release(&target);
        copied.map(|()| target)
    }
}

impl ChangeSink for CopyToOutput {
    fn deliver(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("cannot copy {:?}: no usable file name", path))?;

        self.output_dirs
            .iter()
            .map(|dir| self.copy_one(path, dir, file_name))
            .collect()
    }
}

/// First of `<dir>/<name>`, `<dir>/(Copy 1) <name>`, ... that does not exist.
pub fn free_target(fs: &dyn FileSystem, dir: &Path, file_name: &str) -> PathBuf {
    next_target(dir, file_name, |candidate| fs.exists(candidate))
}

fn next_target(dir: &Path, file_name: &str, mut taken: impl FnMut(&Path) -> bool) -> PathBuf {
    let mut candidate = dir.join(file_name);
    let mut counter = 1;
    while taken(&candidate) {
        candidate = dir.join(format!("(Copy {counter}) {file_name}"));
        counter += 1;
    }
    candidate
}
