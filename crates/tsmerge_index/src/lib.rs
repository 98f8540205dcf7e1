//! # tsmerge Index
//!
//! Time-overlap queries over data files.
//!
//! Every data file records, per device, the earliest and latest timestamp it
//! holds. Compaction selection consumes these ranges only through the
//! [`TimeIndex`] trait; it never reads chunks itself.
//!
//! ## Available Indexes
//!
//! - [`DeviceTimeIndex`] - One exact range per device
//! - [`FileTimeIndex`] - One coarse range shared by every device of a file
//!
//! ## Example
//!
//! ```rust
//! use tsmerge_index::{DeviceTimeIndex, TimeIndex, TimeRange};
//!
//! let mut index = DeviceTimeIndex::new();
//! index.update_start_time("root.sg.d0", 10);
//! index.update_end_time("root.sg.d0", 20);
//! assert_eq!(index.time_range("root.sg.d0").unwrap(), TimeRange::new(10, 20));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod device;
mod error;
mod file;
mod index;
mod range;

pub use device::DeviceTimeIndex;
pub use error::{IndexError, IndexResult};
pub use file::FileTimeIndex;
pub use index::TimeIndex;
pub use range::{TimeRange, Timestamp};
