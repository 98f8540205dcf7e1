//! Merge file selection.
//!
//! A selector looks at a [`MergeResource`] and decides which sequential
//! prefix and which unsequential files one merge cycle folds together.
//!
//! ## Invariants
//!
//! Every [`Selection::Chosen`] returned by a selector satisfies:
//!
//! - the sequential files are a prefix of [`MergeResource::seq_files`]
//! - no selected file is open
//! - the estimated cost of all selected files is within the budget
//! - no more unsequential files than the configured cap are selected

mod cost;
mod max_file;
mod selection;

pub use cost::CostModel;
pub use max_file::MaxFileSelector;
pub use selection::{Selection, SelectionReport, StopReason};

use crate::error::MergeResult;
use crate::resource::MergeResource;

/// Strategy for choosing the files of one merge cycle.
pub trait FileSelector {
    /// Chooses the files to merge from `resource`.
    ///
    /// Returns [`Selection::Empty`] when nothing is worth merging. Calling
    /// it twice on the same resource yields the same selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource was released or its metadata is
    /// inconsistent.
    fn select<'a>(&self, resource: &MergeResource<'a>) -> MergeResult<Selection<'a>>;
}
