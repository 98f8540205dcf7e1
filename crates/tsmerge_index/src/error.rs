//! Error types for time index lookups.

use thiserror::Error;

/// Result type for time index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur while querying a time index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The index holds no range for the requested device.
    #[error("unknown device: {device}")]
    UnknownDevice {
        /// The device that was looked up.
        device: String,
    },

    /// A recorded range ends before it starts.
    #[error("invalid time range for {device}: start {start} > end {end}")]
    InvalidRange {
        /// The device owning the range.
        device: String,
        /// Recorded start time.
        start: i64,
        /// Recorded end time.
        end: i64,
    },
}

impl IndexError {
    /// Creates an unknown device error.
    pub fn unknown_device(device: impl Into<String>) -> Self {
        Self::UnknownDevice {
            device: device.into(),
        }
    }
}
