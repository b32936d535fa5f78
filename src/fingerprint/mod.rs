// src/fingerprint/mod.rs

//! Per-file change detection: compute a fresh fingerprint (content digest
//! and/or modification time) and compare it with the stored one.

pub mod hash;
pub mod policy;

pub use hash::compute_file_hash;
pub use policy::{evaluate, has_changed, observe, Evaluation, Observation};
