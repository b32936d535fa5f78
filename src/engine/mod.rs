// src/engine/mod.rs

//! Orchestration engine for deltascan.
//!
//! Opens the history store, then walks the configured watch roots in order,
//! handing each to the [`ScanPipeline`](crate::scan::ScanPipeline) and
//! aggregating the outcomes into a [`RunSummary`]. A run ends after the last
//! root; there is no long-running watch mode.

use std::fmt;

use crate::scan::{ScanReport, ScanTally};

pub mod runtime;

pub use runtime::Engine;

/// Outcome of one full run over every watch root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One report per watch root, in configuration order.
    pub roots: Vec<ScanReport>,
}

impl RunSummary {
    pub fn totals(&self) -> ScanTally {
        let mut total = ScanTally::default();
        for report in &self.roots {
            total += report.tally();
        }
        total
    }

    pub fn files_changed(&self) -> usize {
        self.totals().changed
    }

    pub fn files_unchanged(&self) -> usize {
        self.totals().unchanged
    }

    pub fn files_in_error(&self) -> usize {
        self.totals().errors
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.totals();
        writeln!(f, "COMPLETE")?;
        writeln!(f, "\tFiles Copied: {}", totals.changed)?;
        writeln!(f, "\tFiles Unchanged: {}", totals.unchanged)?;
        write!(f, "\tFiles With Errors: {}", totals.errors)
    }
}
