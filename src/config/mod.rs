// src/config/mod.rs

//! Configuration loading and validation for deltascan.
//!
//! Responsibilities:
//! - Define the on-disk data model (`model.rs`).
//! - Load a config file from disk, JSON or TOML (`loader.rs`).
//! - Validate and normalize it into a [`Config`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{Config, OutputDirs, RawConfigFile};
