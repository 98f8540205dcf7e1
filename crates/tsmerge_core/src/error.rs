//! Error types for merge selection.

use crate::types::FileId;
use thiserror::Error;

/// Result type for merge selection operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors that can occur while building a merge resource or selecting files.
///
/// An empty selection is **not** an error: a lack of budget, a zero cap or
/// an open first file all produce [`crate::Selection::Empty`].
#[derive(Debug, Error)]
pub enum MergeError {
    /// Time index lookup failed.
    #[error("time index error: {0}")]
    Index(#[from] tsmerge_index::IndexError),

    /// The file snapshot breaks an invariant the catalogue must uphold.
    #[error("data integrity violation: {message}")]
    DataIntegrity {
        /// Description of the violation.
        message: String,
    },

    /// A file was queried for a device it does not record.
    #[error("{file} records no data for device {device}")]
    UnknownDevice {
        /// The file that was queried.
        file: FileId,
        /// The device that was looked up.
        device: String,
    },

    /// The merge resource was queried after it was released.
    #[error("merge resource already released")]
    ResourceReleased,

    /// A time range update was attempted on a sealed file.
    #[error("{file} is sealed; its time ranges are frozen")]
    FileSealed {
        /// The sealed file.
        file: FileId,
    },

    /// Selector configuration is unusable.
    #[error("invalid selector configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl MergeError {
    /// Creates a data integrity error.
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    /// Creates an unknown device error.
    pub fn unknown_device(file: FileId, device: impl Into<String>) -> Self {
        Self::UnknownDevice {
            file,
            device: device.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if the error signals a corrupted catalogue snapshot.
    ///
    /// Such errors abort the cycle; retrying against the same snapshot will
    /// fail the same way.
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::DataIntegrity { .. } | Self::UnknownDevice { .. } | Self::Index(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsmerge_index::IndexError;

    #[test]
    fn integrity_classification() {
        assert!(MergeError::data_integrity("overlap").is_data_integrity());
        assert!(MergeError::unknown_device(FileId::new(1), "d0").is_data_integrity());
        assert!(MergeError::from(IndexError::unknown_device("d0")).is_data_integrity());
        assert!(!MergeError::ResourceReleased.is_data_integrity());
        assert!(!MergeError::invalid_config("zero").is_data_integrity());
    }

    #[test]
    fn messages_name_the_file() {
        let err = MergeError::unknown_device(FileId::new(7), "root.sg.d1");
        assert_eq!(err.to_string(), "file:7 records no data for device root.sg.d1");
    }
}
