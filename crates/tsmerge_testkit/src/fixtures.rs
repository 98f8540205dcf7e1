//! File builders and catalogue fixtures.
//!
//! Provides convenience functions for setting up sequential chains and
//! unsequential files in the layouts selection tests keep coming back to.

use std::ops::Range;
use tsmerge_core::{FileId, FileResource, FileVersion};
use tsmerge_index::{DeviceTimeIndex, TimeRange, Timestamp};

/// Devices per file in [`StandardFiles`].
pub const DEVICE_COUNT: usize = 10;

/// Measurements per device in [`StandardFiles`].
pub const MEASUREMENT_COUNT: u32 = 10;

/// Timestamps covered by each sequential file in [`StandardFiles`].
pub const POINTS_PER_FILE: i64 = 100;

/// Sequential files in [`StandardFiles`].
pub const SEQ_FILE_COUNT: usize = 5;

/// Unsequential files in [`StandardFiles`].
pub const UNSEQ_FILE_COUNT: usize = 5;

/// Returns the name of test device `index`.
#[must_use]
pub fn device_id(index: usize) -> String {
    format!("root.mergeTest.device{index}")
}

/// Builder for test [`FileResource`]s.
///
/// Files are sealed unless [`FileBuilder::open`] is called.
///
/// # Example
///
/// ```rust
/// use tsmerge_testkit::FileBuilder;
///
/// let file = FileBuilder::new(3)
///     .points(0, 100, 2)
///     .measurements(4)
///     .build();
/// assert!(file.is_closed());
/// assert_eq!(file.device_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FileBuilder {
    id: u64,
    version: u64,
    closed: bool,
    measurement_count: u32,
    index: DeviceTimeIndex,
}

impl FileBuilder {
    /// Starts a sealed file with id and version `id`.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            version: id,
            closed: true,
            measurement_count: 1,
            index: DeviceTimeIndex::new(),
        }
    }

    /// Sets the file version.
    #[must_use]
    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Builds the file as still being written.
    #[must_use]
    pub fn open(mut self) -> Self {
        self.closed = false;
        self
    }

    /// Sets the number of measurements per device.
    #[must_use]
    pub fn measurements(mut self, count: u32) -> Self {
        self.measurement_count = count;
        self
    }

    /// Records `[start, end]` for `device`.
    #[must_use]
    pub fn range(mut self, device: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        self.index.insert(device, TimeRange::new(start, end));
        self
    }

    /// Records `count` consecutive timestamps from `start` for the first
    /// `devices` test devices.
    #[must_use]
    pub fn points(mut self, start: Timestamp, count: i64, devices: usize) -> Self {
        for device in 0..devices {
            self.index
                .insert(device_id(device), TimeRange::new(start, start + count - 1));
        }
        self
    }

    /// Builds the file.
    #[must_use]
    pub fn build(self) -> FileResource {
        let id = FileId::new(self.id);
        let version = FileVersion::new(self.version);
        let file = if self.closed {
            FileResource::sealed(id, version, self.index)
        } else {
            FileResource::new(id, version, self.index)
        };
        file.with_measurement_count(self.measurement_count)
    }
}

/// Builds one sealed single-timestamp file per entry of `times`.
///
/// File `t` gets id `t` and records `[t, t]` for the first `devices` test
/// devices.
#[must_use]
pub fn point_chain(times: Range<i64>, devices: usize, measurements: u32) -> Vec<FileResource> {
    times
        .map(|t| {
            FileBuilder::new(t as u64)
                .points(t, 1, devices)
                .measurements(measurements)
                .build()
        })
        .collect()
}

/// The canonical five-by-five catalogue.
///
/// - sequential file `i` (id `i`) covers `[100i, 100i + 99]`
/// - unsequential file `i` (id `100 + i`) covers `[100i, 100i + 20(i + 1) - 1]`,
///   so each one sits inside sequential file `i`
///
/// Every file holds [`DEVICE_COUNT`] devices with [`MEASUREMENT_COUNT`]
/// measurements each.
#[derive(Debug)]
pub struct StandardFiles {
    /// Sequential chain.
    pub seq: Vec<FileResource>,
    /// Unsequential files.
    pub unseq: Vec<FileResource>,
}

impl StandardFiles {
    /// Creates the catalogue.
    #[must_use]
    pub fn new() -> Self {
        let seq = (0..SEQ_FILE_COUNT)
            .map(|i| {
                FileBuilder::new(i as u64)
                    .points(i as i64 * POINTS_PER_FILE, POINTS_PER_FILE, DEVICE_COUNT)
                    .measurements(MEASUREMENT_COUNT)
                    .build()
            })
            .collect();
        let unseq = (0..UNSEQ_FILE_COUNT)
            .map(|i| {
                let len = POINTS_PER_FILE * (i as i64 + 1) / UNSEQ_FILE_COUNT as i64;
                FileBuilder::new(100 + i as u64)
                    .version(10_000 + i as u64)
                    .points(i as i64 * POINTS_PER_FILE, len, DEVICE_COUNT)
                    .measurements(MEASUREMENT_COUNT)
                    .build()
            })
            .collect();
        Self { seq, unseq }
    }

    /// Builds an unsequential file spanning `count` timestamps from `start`
    /// with the standard device layout.
    #[must_use]
    pub fn unseq_span(id: u64, start: Timestamp, count: i64) -> FileResource {
        FileBuilder::new(id)
            .points(start, count, DEVICE_COUNT)
            .measurements(MEASUREMENT_COUNT)
            .build()
    }
}

impl Default for StandardFiles {
    fn default() -> Self {
        Self::new()
    }
}

/// Two sequential files and two unsequential files where each unsequential
/// file resolves against a different sequential file.
///
/// - seq 1: every device `[0, 9]` except device 3 at `[0, 5]`
/// - seq 2: every device `[11, 20]`
/// - unseq 3: every device `[0, 1]`
/// - unseq 4: every device but 3 at `[6, 14]`, device 3 at `[1, 1]`
#[must_use]
pub fn two_group_files() -> (Vec<FileResource>, Vec<FileResource>) {
    let mut first = FileBuilder::new(1).measurements(MEASUREMENT_COUNT);
    for device in 0..4 {
        let end = if device == 3 { 5 } else { 9 };
        first = first.range(device_id(device), 0, end);
    }
    let second = FileBuilder::new(2)
        .points(11, 10, 4)
        .measurements(MEASUREMENT_COUNT);
    let third = FileBuilder::new(3)
        .points(0, 2, 4)
        .measurements(MEASUREMENT_COUNT);
    let mut fourth = FileBuilder::new(4).measurements(MEASUREMENT_COUNT);
    for device in 0..4 {
        fourth = if device == 3 {
            fourth.range(device_id(device), 1, 1)
        } else {
            fourth.range(device_id(device), 6, 14)
        };
    }

    (
        vec![first.build(), second.build()],
        vec![third.build(), fourth.build()],
    )
}
