//! Memory cost estimation for merge candidates.

use crate::resource::FileResource;

/// Estimates the memory a file costs when it takes part in a merge.
///
/// `cost = file_overhead + devices * (device_overhead + measurements * chunk_cost)`
///
/// The coefficients are tuning knobs. What the selector relies on is that
/// the estimate never shrinks when a file gains devices or measurements, so
/// adding files to a candidate set can only raise its total cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    /// Fixed cost of opening a file (reader, footer, metadata).
    pub file_overhead: u64,
    /// Cost per device of the file.
    pub device_overhead: u64,
    /// Cost per chunk, one chunk per measurement of each device.
    pub chunk_cost: u64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            file_overhead: 4096,
            device_overhead: 64,
            chunk_cost: 400,
        }
    }
}

impl CostModel {
    /// Creates a cost model with default coefficients.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fixed per-file overhead.
    #[must_use]
    pub const fn with_file_overhead(mut self, bytes: u64) -> Self {
        self.file_overhead = bytes;
        self
    }

    /// Sets the per-device overhead.
    #[must_use]
    pub const fn with_device_overhead(mut self, bytes: u64) -> Self {
        self.device_overhead = bytes;
        self
    }

    /// Sets the per-chunk cost.
    #[must_use]
    pub const fn with_chunk_cost(mut self, bytes: u64) -> Self {
        self.chunk_cost = bytes;
        self
    }

    /// Returns true if every coefficient is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.file_overhead == 0 && self.device_overhead == 0 && self.chunk_cost == 0
    }

    /// Estimates the cost of a file with the given shape. Saturates at `u64::MAX`.
    #[must_use]
    pub fn estimate(&self, device_count: usize, measurement_count: u32) -> u64 {
        let per_device = self
            .chunk_cost
            .saturating_mul(u64::from(measurement_count))
            .saturating_add(self.device_overhead);
        let devices = u64::try_from(device_count).unwrap_or(u64::MAX);
        self.file_overhead
            .saturating_add(devices.saturating_mul(per_device))
    }

    /// Estimates the cost of `file` from its time index.
    #[must_use]
    pub fn file_cost(&self, file: &FileResource) -> u64 {
        self.estimate(file.device_count(), file.measurement_count())
    }
}
