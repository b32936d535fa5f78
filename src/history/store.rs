// src/history/store.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::errors::{DeltascanError, Result};
use crate::fs::FileSystem;
use crate::history::record::{FingerprintRecord, HistoryEntry};

/// Durable mapping from file path to its last recorded fingerprint.
///
/// The in-memory map is the single source of truth for one run. Every
/// [`set`](HistoryStore::set) replaces the record for its path and rewrites
/// the whole store file atomically. The map lock only covers the insert and
/// the encoding of a snapshot; the file write happens under a separate write
/// lock, so readers never wait on disk I/O and snapshots reach the disk in
/// the order they were taken.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    records: Mutex<HashMap<PathBuf, FingerprintRecord>>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Load the store file at `path` (or start empty if it does not exist).
    pub fn open(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load(fs.as_ref(), &path)?;
        info!(path = ?path, records = records.len(), "history store loaded");
        Ok(Self {
            path,
            fs,
            records: Mutex::new(records),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored record for `file_path`, or [`FingerprintRecord::unknown`].
    pub fn get(&self, file_path: &Path) -> FingerprintRecord {
        self.lock()
            .get(file_path)
            .cloned()
            .unwrap_or_else(|| FingerprintRecord::unknown(file_path))
    }

    /// Insert or replace the record for `record.file_path`, then persist the
    /// entire map.
    ///
    /// A failed write leaves the in-memory map updated; the next successful
    /// write brings the file back in line.
    pub fn set(&self, record: FingerprintRecord) -> Result<()> {
        // Taken first: the snapshot encoded below must not be overtaken on
        // disk by a later one.
        let _writing = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let json = {
            let mut records = self.lock();
            debug!(file = ?record.file_path, "updating history record");
            records.insert(record.file_path.clone(), record);
            encode(&records)?
        };

        self.fs
            .write_atomic(&self.path, &json)
            .with_context(|| format!("writing history store {:?}", self.path))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All records, sorted by path.
    pub fn snapshot(&self) -> Vec<FingerprintRecord> {
        let mut out: Vec<FingerprintRecord> = self.lock().values().cloned().collect();
        out.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        out
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, FingerprintRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn encode(records: &HashMap<PathBuf, FingerprintRecord>) -> Result<Vec<u8>> {
    let mut entries: Vec<HistoryEntry> = records.values().map(HistoryEntry::from).collect();
    // Sorted output keeps the file byte-identical when nothing changed.
    entries.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    Ok(serde_json::to_vec(&entries)?)
}

/// Read the store file at `path` into a map keyed by file path.
///
/// - Missing file: empty map and a warning (first run).
/// - Unparseable file: [`DeltascanError::HistoryCorrupt`]. Falling back to an
///   empty map here would report every file as changed.
/// - Duplicate paths in the file: the last entry wins.
pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<HashMap<PathBuf, FingerprintRecord>> {
    if !fs.exists(path) {
        warn!("History file does not exist at {:?}", path);
        warn!("... new file will be created.");
        return Ok(HashMap::new());
    }

    let contents = fs
        .read_to_string(path)
        .with_context(|| format!("reading history store {:?}", path))?;

    let entries: Vec<HistoryEntry> =
        serde_json::from_str(&contents).map_err(|e| DeltascanError::HistoryCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(entries
        .into_iter()
        .map(FingerprintRecord::from)
        .map(|record| (record.file_path.clone(), record))
        .collect())
}
