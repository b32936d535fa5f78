// src/history/record.rs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Hash value written when hashing is disabled.
pub const HASH_NOT_CALCULATED: &str = "NOT CALCULATED";

/// Placeholder hash older history files use for unknown entries.
pub const HASH_UNKNOWN: &str = "-";

/// Last-known fingerprint of one file.
///
/// Unknown parts are `None` rather than a sentinel string, so an unknown
/// fingerprint can never compare equal to a real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub file_path: PathBuf,
    /// Lowercase hex digest, if one was computed.
    pub content_hash: Option<String>,
    /// Milliseconds since the Unix epoch, if known.
    pub modified_time: Option<i64>,
}

impl FingerprintRecord {
    pub fn new(
        file_path: impl Into<PathBuf>,
        content_hash: Option<String>,
        modified_time: Option<i64>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            content_hash,
            modified_time,
        }
    }

    /// Placeholder for a path the store has never seen.
    pub fn unknown(file_path: impl AsRef<Path>) -> Self {
        Self::new(file_path.as_ref(), None, None)
    }

    pub fn is_unknown(&self) -> bool {
        self.content_hash.is_none() && self.modified_time.is_none()
    }
}

/// On-disk shape of one history entry: `{filePath, md5Hash, modifiedTime}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryEntry {
    pub file_path: PathBuf,
    #[serde(default)]
    pub md5_hash: Option<String>,
    #[serde(default)]
    pub modified_time: Option<i64>,
}

impl From<HistoryEntry> for FingerprintRecord {
    fn from(entry: HistoryEntry) -> Self {
        let content_hash = entry
            .md5_hash
            .filter(|h| !h.is_empty() && h != HASH_UNKNOWN && h != HASH_NOT_CALCULATED);
        FingerprintRecord::new(entry.file_path, content_hash, entry.modified_time)
    }
}

impl From<&FingerprintRecord> for HistoryEntry {
    fn from(record: &FingerprintRecord) -> Self {
        HistoryEntry {
            file_path: record.file_path.clone(),
            md5_hash: Some(
                record
                    .content_hash
                    .clone()
                    .unwrap_or_else(|| HASH_NOT_CALCULATED.to_string()),
            ),
            modified_time: record.modified_time,
        }
    }
}
