//! Time index trait definition.

use crate::error::IndexResult;
use crate::range::{TimeRange, Timestamp};

/// Per-file lookup of the time range each device occupies.
///
/// Time indexes are **metadata only**. They know which devices a file holds
/// and when that data starts and ends; they know nothing about chunks,
/// encodings or where the file lives on disk.
///
/// # Invariants
///
/// - `devices` lists exactly the devices `time_range` answers for
/// - ranges only grow while a file is open and are frozen once it is sealed
/// - implementations must be `Send + Sync` so snapshots can be shared
///
/// # Implementors
///
/// - [`super::DeviceTimeIndex`] - Exact range per device
/// - [`super::FileTimeIndex`] - One range for the whole file
pub trait TimeIndex: Send + Sync + std::fmt::Debug {
    /// Returns the devices recorded by this index, in ascending order.
    fn devices(&self) -> Vec<String>;

    /// Returns the recorded range of `device`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::UnknownDevice`] if the index holds no
    /// data for `device`.
    fn time_range(&self, device: &str) -> IndexResult<TimeRange>;

    /// Records that `device` has data at or after `time`.
    fn update_start_time(&mut self, device: &str, time: Timestamp);

    /// Records that `device` has data at or before `time`.
    fn update_end_time(&mut self, device: &str, time: Timestamp);

    /// Drops every recorded end time, keeping start times.
    ///
    /// This is the state of a file that has been reopened for writing: only
    /// where its data starts is trustworthy.
    fn clear_end_times(&mut self);

    /// Returns the number of devices recorded.
    fn device_count(&self) -> usize {
        self.devices().len()
    }

    /// Checks that no recorded range ends before it starts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidRange`] for the first offending
    /// device.
    fn validate(&self) -> IndexResult<()> {
        for device in self.devices() {
            let range = self.time_range(&device)?;
            if let (false, Some(end)) = (range.is_valid(), range.end) {
                return Err(crate::IndexError::InvalidRange {
                    device,
                    start: range.start,
                    end,
                });
            }
        }
        Ok(())
    }
}
