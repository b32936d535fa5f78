// src/config/validate.rs

use crate::config::model::{Config, RawConfigFile};
use crate::errors::{DeltascanError, Result};
use crate::types::ComparisonMode;

impl TryFrom<RawConfigFile> for Config {
    type Error = crate::errors::DeltascanError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        Ok(Config::new_unchecked(
            normalize_extensions(&raw.file_extensions),
            raw.scan_paths,
            raw.output_dir.into_vec(),
            raw.history_store_path,
            ComparisonMode::from_hash_flag(raw.calculate_md5_hash),
            raw.hash_algorithm,
            raw.concurrency,
            raw.copy_changed,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_scan_paths(cfg)?;

    if cfg.history_store_path.as_os_str().is_empty() {
        return Err(DeltascanError::ConfigError(
            "history_store_path must not be empty".to_string(),
        ));
    }

    if cfg.concurrency == 0 {
        return Err(DeltascanError::ConfigError(
            "concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn ensure_has_scan_paths(cfg: &RawConfigFile) -> Result<()> {
    if cfg.scan_paths.is_empty() {
        return Err(DeltascanError::ConfigError(
            "config must list at least one entry in scan_paths".to_string(),
        ));
    }
    if cfg.scan_paths.iter().any(|p| p.as_os_str().is_empty()) {
        return Err(DeltascanError::ConfigError(
            "scan_paths must not contain empty paths".to_string(),
        ));
    }
    Ok(())
}

/// Lowercase, strip leading dots, drop empties and duplicates.
///
/// `[".TXT", "pdf", "."]` becomes `["txt", "pdf"]`.
pub fn normalize_extensions(exts: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(exts.len());
    for ext in exts {
        let norm = ext.trim().trim_start_matches('.').to_lowercase();
        if !norm.is_empty() && !out.contains(&norm) {
            out.push(norm);
        }
    }
    out
}
