// src/history/mod.rs

//! Persisted history of file fingerprints.
//!
//! The store file is a JSON array of `{filePath, md5Hash, modifiedTime}`
//! objects. It is read once at startup and rewritten in full after every
//! update.

pub mod record;
pub mod store;

pub use record::{FingerprintRecord, HASH_NOT_CALCULATED, HASH_UNKNOWN};
pub use store::{load, HistoryStore};
