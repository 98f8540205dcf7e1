//! Merge candidates.
//!
//! A [`FileResource`] is the catalogue's view of one data file. A
//! [`MergeResource`] is the snapshot of candidate files a single merge cycle
//! selects from.

mod file;
mod merge;

pub use file::FileResource;
pub(crate) use merge::FileMetadata;
pub use merge::MergeResource;
