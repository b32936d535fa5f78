// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod fs;
pub mod history;
pub mod logging;
pub mod output;
pub mod scan;
pub mod types;

use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_and_validate, Config};
use crate::engine::{Engine, RunSummary};
use crate::errors::Result;
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (fatal on a bad config)
/// - CLI overrides
/// - history store + engine (fatal on a corrupt history file)
///
/// Returns `None` for `--dry-run`.
pub async fn run(args: CliArgs) -> Result<Option<RunSummary>> {
    let mut cfg = load_and_validate(&args.config)?;

    if let Some(n) = args.concurrency {
        cfg = cfg.with_concurrency(n);
    }
    if args.detect_only {
        cfg = cfg.without_copy();
    }

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(None);
    }

    let engine = Engine::new(cfg, Arc::new(RealFileSystem))?;
    let summary = engine.run().await?;
    Ok(Some(summary))
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &Config) {
    println!("deltascan dry-run");
    println!("  history_store_path = {:?}", cfg.history_store_path());
    println!("  mode = {:?}", cfg.mode());
    if cfg.mode() == types::ComparisonMode::Hash {
        println!("  hash_algorithm = {}", cfg.hash_algorithm());
    }
    println!("  concurrency = {}", cfg.concurrency());
    if cfg.file_extensions().is_empty() {
        println!("  file_extensions = (none: nothing will be scanned)");
    } else {
        println!("  file_extensions = {:?}", cfg.file_extensions());
    }
    println!();

    println!("scan_paths ({}):", cfg.scan_paths().len());
    for root in cfg.scan_paths() {
        println!("  - {}", root.display());
    }

    if cfg.copy_enabled() {
        println!("output_dirs ({}):", cfg.output_dirs().len());
        for dir in cfg.output_dirs() {
            println!("  - {}", dir.display());
        }
    } else {
        println!("copy: disabled");
    }

    debug!("dry-run complete (no scanning)");
}
