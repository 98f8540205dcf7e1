//! Selection outcomes.

use crate::resource::FileResource;
use std::fmt;

/// The files one merge cycle should fold together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Nothing worth merging this cycle. Retry on a later cycle.
    Empty,
    /// A sequential prefix and the unsequential files to fold into it.
    Chosen {
        /// Contiguous prefix of the resource's sequential files.
        seq_files: Vec<&'a FileResource>,
        /// Unsequential files, in the resource's order.
        unseq_files: Vec<&'a FileResource>,
    },
}

impl<'a> Selection<'a> {
    /// Returns true if no merge should run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the selected sequential files; empty for [`Selection::Empty`].
    #[must_use]
    pub fn seq_files(&self) -> &[&'a FileResource] {
        match self {
            Self::Empty => &[],
            Self::Chosen { seq_files, .. } => seq_files,
        }
    }

    /// Returns the selected unsequential files; empty for [`Selection::Empty`].
    #[must_use]
    pub fn unseq_files(&self) -> &[&'a FileResource] {
        match self {
            Self::Empty => &[],
            Self::Chosen { unseq_files, .. } => unseq_files,
        }
    }

    /// Returns the total number of selected files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.seq_files().len() + self.unseq_files().len()
    }

    /// Splits a chosen selection into `(seq_files, unseq_files)`.
    #[must_use]
    pub fn into_parts(self) -> Option<(Vec<&'a FileResource>, Vec<&'a FileResource>)> {
        match self {
            Self::Empty => None,
            Self::Chosen {
                seq_files,
                unseq_files,
            } => Some((seq_files, unseq_files)),
        }
    }
}

/// Why the selection pass stopped extending the sequential prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Every sequential candidate was examined.
    Exhausted,
    /// A sequential file, or an unsequential file it would resolve, is open.
    OpenFile,
    /// Admitting the next group would exceed the unsequential file cap.
    CapReached,
    /// Admitting the next group would exceed the memory budget.
    BudgetExceeded,
}

impl StopReason {
    /// Returns a short, stable name for logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::OpenFile => "open-file",
            Self::CapReached => "cap-reached",
            Self::BudgetExceeded => "budget-exceeded",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostics of one selection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionReport {
    /// Why the pass ended.
    pub stop_reason: StopReason,
    /// Number of sequential files the pass looked at.
    pub seq_examined: usize,
    /// Estimated cost of the returned selection.
    pub total_cost: u64,
    /// Committed sequential files dropped because nothing folds into them.
    pub trimmed_seq_files: usize,
}
