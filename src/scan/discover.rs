// src/scan/discover.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::fs::{temp_path_for, FileSystem};

/// Case-insensitive file-name filter built from the configured extensions.
///
/// An empty extension list matches nothing.
#[derive(Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for ExtensionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionMatcher")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl ExtensionMatcher {
    /// `extensions` are expected normalized (no leading dot).
    pub fn new(extensions: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for ext in extensions {
            let pattern = format!("*.{}", globset::escape(ext));
            let glob = GlobBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("invalid file extension: {ext}"))?;
            builder.add(glob);
        }

        Ok(Self {
            extensions: extensions.to_vec(),
            set: builder.build()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.set.is_match(name))
    }
}

/// Files that must never be treated as scan candidates, such as the history
/// store and its temporary file when they live inside a watch root.
///
/// Paths are compared with their parent directory canonicalized, so a
/// relative store path still matches the walker's absolute candidates.
#[derive(Debug, Clone, Default)]
pub struct ExcludedPaths {
    paths: Vec<PathBuf>,
}

impl ExcludedPaths {
    pub fn new(fs: &dyn FileSystem, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths
                .into_iter()
                .map(|p| resolve_parent(fs, &p))
                .collect(),
        }
    }

    /// The history store file and the `.tmp` file it is written through.
    pub fn for_history_store(fs: &dyn FileSystem, store_path: &Path) -> Self {
        Self::new(
            fs,
            [store_path.to_path_buf(), temp_path_for(store_path)],
        )
    }

    pub fn contains(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        // Cheap name check first; only candidates sharing a file name get
        // their parent canonicalized.
        if !self
            .paths
            .iter()
            .any(|p| p.file_name() == path.file_name())
        {
            return false;
        }
        self.paths.contains(&resolve_parent(fs, path))
    }
}

fn resolve_parent(fs: &dyn FileSystem, path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    fs.canonicalize(parent)
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Collect all files under `root` whose name matches `matcher`, sorted.
///
/// Symlinked directories below `root` are not followed. A `root` that is
/// itself a file is returned as-is if it matches.
pub fn discover_files(
    fs: &dyn FileSystem,
    root: &Path,
    matcher: &ExtensionMatcher,
    excluded: &ExcludedPaths,
) -> Result<Vec<PathBuf>> {
    let wanted = |path: &Path| matcher.matches(path) && !excluded.contains(fs, path);

    if fs.is_file(root) {
        return Ok(if wanted(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                if !fs.is_symlink(&path) {
                    stack.push(path);
                }
            } else if fs.is_file(&path) && wanted(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
