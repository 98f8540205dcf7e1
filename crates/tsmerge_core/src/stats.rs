//! Selector statistics.
//!
//! Counters describing what a selector has done over its lifetime. They are
//! observational only: selection never reads them.
//!
//! # Usage
//!
//! ```rust,ignore
//! let selector = MaxFileSelector::new(SelectorConfig::default())?;
//! selector.select(&resource)?;
//!
//! let stats = selector.stats().snapshot();
//! println!("Selections: {}", stats.selections);
//! println!("Empty: {}", stats.empty_selections);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Selector statistics.
///
/// All counters are atomic and monotonically increasing, so a selector can
/// be shared across threads while they are read.
#[derive(Debug, Default)]
pub struct SelectorStats {
    /// Total number of selection passes.
    selections: AtomicU64,
    /// Passes that produced a chosen selection.
    chosen_selections: AtomicU64,
    /// Passes that produced an empty selection.
    empty_selections: AtomicU64,
    /// Passes aborted by a data integrity violation.
    integrity_errors: AtomicU64,
    /// Sequential files handed to the merge executor.
    seq_files_chosen: AtomicU64,
    /// Unsequential files handed to the merge executor.
    unseq_files_chosen: AtomicU64,
}

impl SelectorStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a chosen selection.
    pub(crate) fn record_chosen(&self, seq_files: usize, unseq_files: usize) {
        self.selections.fetch_add(1, Ordering::Relaxed);
        self.chosen_selections.fetch_add(1, Ordering::Relaxed);
        self.seq_files_chosen
            .fetch_add(seq_files as u64, Ordering::Relaxed);
        self.unseq_files_chosen
            .fetch_add(unseq_files as u64, Ordering::Relaxed);
    }

    /// Records an empty selection.
    pub(crate) fn record_empty(&self) {
        self.selections.fetch_add(1, Ordering::Relaxed);
        self.empty_selections.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a pass that failed.
    pub(crate) fn record_error(&self, integrity: bool) {
        self.selections.fetch_add(1, Ordering::Relaxed);
        if integrity {
            self.integrity_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the total number of selection passes.
    pub fn selections(&self) -> u64 {
        self.selections.load(Ordering::Relaxed)
    }

    /// Returns the number of passes that produced a chosen selection.
    pub fn chosen_selections(&self) -> u64 {
        self.chosen_selections.load(Ordering::Relaxed)
    }

    /// Returns the number of passes that produced an empty selection.
    pub fn empty_selections(&self) -> u64 {
        self.empty_selections.load(Ordering::Relaxed)
    }

    /// Returns the number of passes aborted by a data integrity violation.
    pub fn integrity_errors(&self) -> u64 {
        self.integrity_errors.load(Ordering::Relaxed)
    }

    /// Returns a point-in-time copy of all counters.
    pub fn snapshot(&self) -> SelectorStatsSnapshot {
        SelectorStatsSnapshot {
            selections: self.selections(),
            chosen_selections: self.chosen_selections(),
            empty_selections: self.empty_selections(),
            integrity_errors: self.integrity_errors(),
            seq_files_chosen: self.seq_files_chosen.load(Ordering::Relaxed),
            unseq_files_chosen: self.unseq_files_chosen.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.selections.store(0, Ordering::Relaxed);
        self.chosen_selections.store(0, Ordering::Relaxed);
        self.empty_selections.store(0, Ordering::Relaxed);
        self.integrity_errors.store(0, Ordering::Relaxed);
        self.seq_files_chosen.store(0, Ordering::Relaxed);
        self.unseq_files_chosen.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`SelectorStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorStatsSnapshot {
    /// Total number of selection passes.
    pub selections: u64,
    /// Passes that produced a chosen selection.
    pub chosen_selections: u64,
    /// Passes that produced an empty selection.
    pub empty_selections: u64,
    /// Passes aborted by a data integrity violation.
    pub integrity_errors: u64,
    /// Sequential files handed to the merge executor.
    pub seq_files_chosen: u64,
    /// Unsequential files handed to the merge executor.
    pub unseq_files_chosen: u64,
}
