//! File-granularity time index.

use crate::error::{IndexError, IndexResult};
use crate::index::TimeIndex;
use crate::range::{TimeRange, Timestamp};
use std::collections::BTreeSet;

/// A coarse time index holding a single range for the whole file.
///
/// Every device of the file reports the same range: the union of all device
/// ranges. This trades precision for memory on files with many devices.
///
/// A coarse range can only make overlaps look larger, so it is safe for
/// unsequential files. Sequential files need exact per-device ranges: the
/// chain order is checked per device and a widened end would stretch how far
/// a prefix of the chain appears to reach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTimeIndex {
    devices: BTreeSet<String>,
    range: Option<TimeRange>,
}

impl FileTimeIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses any time index into a file-level index.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors from `index`.
    pub fn degrade(index: &dyn TimeIndex) -> IndexResult<Self> {
        let mut coarse = Self::new();
        for device in index.devices() {
            let range = index.time_range(&device)?;
            coarse.range = Some(match coarse.range {
                Some(existing) => existing.union(&range),
                None => range,
            });
            coarse.devices.insert(device);
        }
        Ok(coarse)
    }

    /// Returns the file-wide range, if any device has been recorded.
    #[must_use]
    pub fn file_range(&self) -> Option<TimeRange> {
        self.range
    }
}

impl TimeIndex for FileTimeIndex {
    fn devices(&self) -> Vec<String> {
        self.devices.iter().cloned().collect()
    }

    fn time_range(&self, device: &str) -> IndexResult<TimeRange> {
        match self.range {
            Some(range) if self.devices.contains(device) => Ok(range),
            _ => Err(IndexError::unknown_device(device)),
        }
    }

    fn update_start_time(&mut self, device: &str, time: Timestamp) {
        self.devices.insert(device.to_string());
        match self.range.as_mut() {
            Some(range) => range.extend_start(time),
            None => self.range = Some(TimeRange::open(time)),
        }
    }

    fn update_end_time(&mut self, device: &str, time: Timestamp) {
        self.devices.insert(device.to_string());
        match self.range.as_mut() {
            Some(range) => range.extend_end(time),
            None => self.range = Some(TimeRange::point(time)),
        }
    }

    fn clear_end_times(&mut self) {
        if let Some(range) = self.range.as_mut() {
            range.end = None;
        }
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }
}
