// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{Config, RawConfigFile};
use crate::errors::{DeltascanError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// Files ending in `.toml` are parsed as TOML; everything else is parsed as
/// JSON. This only performs deserialization; it does **not** normalize or
/// validate. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        DeltascanError::ConfigError(format!("cannot read config file {:?}: {e}", path))
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: RawConfigFile = if is_toml {
        toml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents).map_err(|e| {
            DeltascanError::ConfigError(format!("cannot parse config file {:?}: {e}", path))
        })?
    };

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads JSON (or TOML).
/// - Applies defaults (handled by `serde`).
/// - Normalizes extensions and checks basic sanity (see `validate.rs`).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = load_from_path(&path)?;
    let config = Config::try_from(raw_config)?;
    Ok(config)
}
