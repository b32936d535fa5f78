// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, mtime: i64 },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Reads and stats of these paths fail.
    failing: HashSet<PathBuf>,
    /// Monotonic clock used to stamp writes.
    clock: i64,
    writes: HashMap<PathBuf, usize>,
    symlinks: HashSet<PathBuf>,
}

/// In-memory filesystem for tests.
///
/// Every write bumps an internal clock so each write gets a distinct mtime,
/// unless the test pins one with [`MockFileSystem::set_mtime`].
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState {
            clock: 1_000,
            ..MockState::default()
        };
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let mtime = state.clock;
        state.entries.insert(
            path.clone(),
            MockEntry::File {
                content: content.into(),
                mtime,
            },
        );
        *state.writes.entry(path.clone()).or_default() += 1;
        link_into_parent(&mut state.entries, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Pin the modification time of an existing file.
    pub fn set_mtime(&self, path: impl AsRef<Path>, mtime: i64) {
        let mut state = self.state.lock().unwrap();
        if let Some(MockEntry::File { mtime: m, .. }) = state.entries.get_mut(path.as_ref()) {
            *m = mtime;
        }
    }

    /// Make every read or stat of `path` fail.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert(path.as_ref().to_path_buf());
    }

    /// Flag an existing entry as a symbolic link.
    pub fn mark_symlink(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.symlinks.insert(path.as_ref().to_path_buf());
    }

    /// Number of times `path` has been written (including `add_file`).
    pub fn write_count(&self, path: impl AsRef<Path>) -> usize {
        let state = self.state.lock().unwrap();
        state.writes.get(path.as_ref()).copied().unwrap_or(0)
    }

    pub fn read_bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    fn file_content(&self, path: &Path) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        if state.failing.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    if parent == path {
        // Avoid infinite loop at root
        return;
    }
    ensure_dir_entry(entries, parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if !entries.contains_key(path) {
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        link_into_parent(entries, path);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let content = self.file_content(path)?;
        String::from_utf8(content).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let content = self.file_content(path)?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn modified_millis(&self, path: &Path) -> Result<Option<i64>> {
        let state = self.state.lock().unwrap();
        if state.failing.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File { mtime, .. }) => Ok(Some(*mtime)),
            Some(MockEntry::Dir(_)) => Ok(None),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if self.state.lock().unwrap().failing.contains(path) {
            return Err(anyhow!("Read-only file system: {:?}", path));
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let content = self.file_content(from)?;
        self.add_file(to, content);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.symlinks.contains(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
