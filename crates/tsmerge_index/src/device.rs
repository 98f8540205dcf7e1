//! Device-granularity time index.

use crate::error::{IndexError, IndexResult};
use crate::index::TimeIndex;
use crate::range::{TimeRange, Timestamp};
use std::collections::BTreeMap;

/// A time index holding one exact range per device.
///
/// This is the index every sealed file carries by default. Lookups are
/// `O(log n)` in the number of devices.
///
/// # Example
///
/// ```rust
/// use tsmerge_index::{DeviceTimeIndex, TimeIndex, TimeRange};
///
/// let index = DeviceTimeIndex::from_ranges([
///     ("root.sg.d0", TimeRange::new(0, 99)),
///     ("root.sg.d1", TimeRange::new(0, 49)),
/// ]);
/// assert_eq!(index.device_count(), 2);
/// assert!(index.time_range("root.sg.d2").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTimeIndex {
    ranges: BTreeMap<String, TimeRange>,
}

impl DeviceTimeIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index from `(device, range)` pairs.
    ///
    /// A device listed twice keeps the union of its ranges.
    #[must_use]
    pub fn from_ranges<D, I>(ranges: I) -> Self
    where
        D: Into<String>,
        I: IntoIterator<Item = (D, TimeRange)>,
    {
        let mut index = Self::new();
        for (device, range) in ranges {
            index.insert(device, range);
        }
        index
    }

    /// Records `range` for `device`, merging with any existing range.
    pub fn insert(&mut self, device: impl Into<String>, range: TimeRange) {
        self.ranges
            .entry(device.into())
            .and_modify(|existing| *existing = existing.union(&range))
            .or_insert(range);
    }

    /// Iterates over `(device, range)` pairs in device order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimeRange)> {
        self.ranges.iter().map(|(d, r)| (d.as_str(), r))
    }

    /// Returns true if no device has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl TimeIndex for DeviceTimeIndex {
    fn devices(&self) -> Vec<String> {
        self.ranges.keys().cloned().collect()
    }

    fn time_range(&self, device: &str) -> IndexResult<TimeRange> {
        self.ranges
            .get(device)
            .copied()
            .ok_or_else(|| IndexError::unknown_device(device))
    }

    fn update_start_time(&mut self, device: &str, time: Timestamp) {
        match self.ranges.get_mut(device) {
            Some(range) => range.extend_start(time),
            None => {
                self.ranges.insert(device.to_string(), TimeRange::open(time));
            }
        }
    }

    fn update_end_time(&mut self, device: &str, time: Timestamp) {
        match self.ranges.get_mut(device) {
            Some(range) => range.extend_end(time),
            None => {
                self.ranges.insert(device.to_string(), TimeRange::point(time));
            }
        }
    }

    fn clear_end_times(&mut self) {
        for range in self.ranges.values_mut() {
            range.end = None;
        }
    }

    fn device_count(&self) -> usize {
        self.ranges.len()
    }
}
