//! # tsmerge Core
//!
//! Compaction file selection for a time-series storage engine.
//!
//! Data lives in two lineages: a chronologically ordered chain of sealed
//! *sequential* files and a set of *unsequential* files holding out-of-order
//! writes. Before a merge cycle runs, a selector decides which sequential
//! prefix and which unsequential files to fold together, within a memory
//! budget and a cap on unsequential files.
//!
//! This crate provides:
//! - [`FileResource`] - Catalogue metadata of one data file
//! - [`MergeResource`] - A disposable per-cycle snapshot of candidate files
//! - [`MaxFileSelector`] - Greedy selector maximizing the files merged
//! - [`Selection`] - The outcome handed to the merge executor
//!
//! ## Example
//!
//! ```rust
//! use tsmerge_core::{
//!     FileId, FileResource, FileSelector, FileVersion, MaxFileSelector, MergeResource,
//!     SelectorConfig,
//! };
//! use tsmerge_index::{DeviceTimeIndex, TimeRange};
//!
//! let seq = FileResource::sealed(
//!     FileId::new(0),
//!     FileVersion::new(0),
//!     DeviceTimeIndex::from_ranges([("root.sg.d0", TimeRange::new(0, 99))]),
//! );
//! let unseq = FileResource::sealed(
//!     FileId::new(1),
//!     FileVersion::new(1),
//!     DeviceTimeIndex::from_ranges([("root.sg.d0", TimeRange::new(10, 20))]),
//! );
//!
//! let seq_files = [seq];
//! let unseq_files = [unseq];
//! let resource = MergeResource::new(&seq_files, &unseq_files).unwrap();
//! let selector = MaxFileSelector::new(SelectorConfig::unlimited()).unwrap();
//! let selection = selector.select(&resource).unwrap();
//! assert_eq!(selection.seq_files().len(), 1);
//! assert_eq!(selection.unseq_files().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod resource;
pub mod selector;
mod stats;
mod types;

pub use config::SelectorConfig;
pub use error::{MergeError, MergeResult};
pub use resource::{FileResource, MergeResource};
pub use selector::{
    CostModel, FileSelector, MaxFileSelector, Selection, SelectionReport, StopReason,
};
pub use stats::{SelectorStats, SelectorStatsSnapshot};
pub use types::{FileId, FileVersion};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
