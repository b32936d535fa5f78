// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How a file is compared against its last recorded fingerprint.
///
/// Derived from `calculate_md5_hash` in the config: `true` selects `Hash`,
/// `false` selects `Timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Compare content digests.
    Hash,
    /// Compare last-modified times (milliseconds since epoch).
    ///
    /// Coarser than `Hash`: a rewrite that keeps the same mtime is missed.
    Timestamp,
}

impl ComparisonMode {
    pub fn from_hash_flag(calculate_hash: bool) -> Self {
        if calculate_hash {
            ComparisonMode::Hash
        } else {
            ComparisonMode::Timestamp
        }
    }
}

/// Digest used when comparing in `ComparisonMode::Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 128-bit MD5, compatible with existing history files.
    Md5,
    /// 256-bit BLAKE3.
    Blake3,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Md5
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => f.write_str("md5"),
            HashAlgorithm::Blake3 => f.write_str("blake3"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(format!(
                "invalid hash_algorithm: {other} (expected \"md5\" or \"blake3\")"
            )),
        }
    }
}
