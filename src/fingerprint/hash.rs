// src/fingerprint/hash.rs

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use md5::{Digest, Md5};

use crate::fs::FileSystem;
use crate::types::HashAlgorithm;

/// Compute the lowercase hex digest of a single file, streaming its content.
pub fn compute_file_hash(
    fs: &dyn FileSystem,
    path: &Path,
    algorithm: HashAlgorithm,
) -> Result<String> {
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];

    match algorithm {
        HashAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(format!("{:x}", hasher.finalize()))
        }
        HashAlgorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hasher.finalize().to_hex().to_string())
        }
    }
}
