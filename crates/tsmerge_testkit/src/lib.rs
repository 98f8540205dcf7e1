//! # tsmerge Testkit
//!
//! Test utilities for tsmerge.
//!
//! This crate provides:
//! - File builders and catalogue fixtures mirroring common chain layouts
//! - Property-based generators producing valid sequential chains
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tsmerge_testkit::prelude::*;
//!
//! #[test]
//! fn selects_everything() {
//!     let files = StandardFiles::new();
//!     let resource = MergeResource::new(&files.seq, &files.unseq).unwrap();
//!     // ... run a selector
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
