//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random catalogues that maintain the
//! invariants a merge snapshot requires: sequential files are ordered per
//! device, ids are unique and every range ends at or after its start.
//!
//! [`FileResource`] owns a boxed time index and is not `Clone`, so the
//! strategies produce plain layouts that are turned into files with
//! [`CatalogueLayout::build`].

use crate::fixtures::device_id;
use proptest::prelude::*;
use tsmerge_core::{FileId, FileResource, FileVersion};
use tsmerge_index::{DeviceTimeIndex, TimeRange, Timestamp};

/// Number of distinct devices generated catalogues draw from.
pub const GENERATED_DEVICES: usize = 4;

/// Id of the first generated unsequential file.
const UNSEQ_ID_BASE: u64 = 1_000;

/// Plain description of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayout {
    /// File id.
    pub id: u64,
    /// Whether the file is sealed.
    pub closed: bool,
    /// Measurements per device.
    pub measurements: u32,
    /// Recorded device ranges.
    pub ranges: Vec<(String, TimeRange)>,
}

impl FileLayout {
    /// Builds the file. Open files only keep their start times.
    #[must_use]
    pub fn build(&self) -> FileResource {
        let index = DeviceTimeIndex::from_ranges(self.ranges.iter().cloned());
        let mut file = FileResource::sealed(FileId::new(self.id), FileVersion::new(self.id), index)
            .with_measurement_count(self.measurements);
        if !self.closed {
            file.mark_open();
        }
        file
    }

    /// Returns the largest recorded end, if any.
    #[must_use]
    pub fn max_end(&self) -> Option<Timestamp> {
        self.ranges.iter().filter_map(|(_, r)| r.end).max()
    }
}

/// A generated catalogue: a sequential chain and unsequential files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueLayout {
    /// Sequential files in chronological order.
    pub seq: Vec<FileLayout>,
    /// Unsequential files in catalogue order.
    pub unseq: Vec<FileLayout>,
}

impl CatalogueLayout {
    /// Builds `(seq_files, unseq_files)`.
    #[must_use]
    pub fn build(&self) -> (Vec<FileResource>, Vec<FileResource>) {
        (
            self.seq.iter().map(FileLayout::build).collect(),
            self.unseq.iter().map(FileLayout::build).collect(),
        )
    }

    /// Returns the latest timestamp covered by the sequential chain.
    #[must_use]
    pub fn chain_end(&self) -> Timestamp {
        self.seq.iter().filter_map(FileLayout::max_end).max().unwrap_or(0)
    }

    /// Returns true if any file is open.
    #[must_use]
    pub fn has_open_files(&self) -> bool {
        self.seq.iter().chain(self.unseq.iter()).any(|f| !f.closed)
    }
}

/// One device slot of a generated file: presence and two offsets.
type DeviceSlot = (bool, u8, u8);

fn device_slots() -> impl Strategy<Value = Vec<DeviceSlot>> {
    prop::collection::vec((any::<bool>(), 0u8..64, 0u8..64), GENERATED_DEVICES)
}

/// Turns device slots into ranges inside `[start, start + width - 1]`.
///
/// At least one device is always present.
fn slot_ranges(slots: &[DeviceSlot], start: Timestamp, width: i64) -> Vec<(String, TimeRange)> {
    let mut ranges: Vec<(String, TimeRange)> = slots
        .iter()
        .enumerate()
        .filter(|(_, (present, _, _))| *present)
        .map(|(device, &(_, a, b))| {
            let lo = i64::from(a.min(b)) % width;
            let hi = i64::from(a.max(b)) % width;
            (device_id(device), TimeRange::new(start + lo.min(hi), start + lo.max(hi)))
        })
        .collect();
    if ranges.is_empty() {
        ranges.push((device_id(0), TimeRange::new(start, start + width - 1)));
    }
    ranges
}

/// Strategy for a sealed sequential chain of `1..max_files` files.
///
/// File `i` gets id `i`. Each file occupies its own window of the time
/// axis, so every device is strictly ordered along the chain.
pub fn seq_chain_strategy(max_files: usize) -> impl Strategy<Value = Vec<FileLayout>> {
    prop::collection::vec((1i64..50, 1i64..20, 1u32..5, device_slots()), 1..max_files.max(2))
        .prop_map(|files| {
            let mut start = 0;
            files
                .into_iter()
                .enumerate()
                .map(|(i, (width, gap, measurements, slots))| {
                    let layout = FileLayout {
                        id: i as u64,
                        closed: true,
                        measurements,
                        ranges: slot_ranges(&slots, start, width),
                    };
                    start += width + gap;
                    layout
                })
                .collect()
        })
}

/// Strategy for `0..max_files` sealed unsequential files whose ranges fall
/// anywhere in `[0, horizon)`.
pub fn unseq_files_strategy(
    max_files: usize,
    horizon: i64,
) -> impl Strategy<Value = Vec<FileLayout>> {
    let horizon = horizon.max(1);
    prop::collection::vec(
        (0..horizon, 1i64..64, 1u32..5, device_slots()),
        0..max_files.max(1),
    )
    .prop_map(|files| {
        files
            .into_iter()
            .enumerate()
            .map(|(i, (start, width, measurements, slots))| FileLayout {
                id: UNSEQ_ID_BASE + i as u64,
                closed: true,
                measurements,
                ranges: slot_ranges(&slots, start, width),
            })
            .collect()
    })
}

/// Strategy for a fully sealed catalogue.
pub fn sealed_catalogue_strategy(
    max_seq: usize,
    max_unseq: usize,
) -> impl Strategy<Value = CatalogueLayout> {
    seq_chain_strategy(max_seq).prop_flat_map(move |seq| {
        let horizon = seq.iter().filter_map(FileLayout::max_end).max().unwrap_or(0) + 20;
        unseq_files_strategy(max_unseq, horizon).prop_map(move |unseq| CatalogueLayout {
            seq: seq.clone(),
            unseq,
        })
    })
}

/// Strategy for a catalogue where roughly one file in eight is still open.
pub fn catalogue_strategy(
    max_seq: usize,
    max_unseq: usize,
) -> impl Strategy<Value = CatalogueLayout> {
    let flags = prop::collection::vec(prop::bool::weighted(0.125), max_seq + max_unseq);
    (sealed_catalogue_strategy(max_seq, max_unseq), flags).prop_map(|(mut catalogue, flags)| {
        let files = catalogue.seq.iter_mut().chain(catalogue.unseq.iter_mut());
        for (file, open) in files.zip(flags) {
            file.closed = !open;
        }
        catalogue
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsmerge_core::MergeResource;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_chains_are_ordered(seq in seq_chain_strategy(8)) {
            prop_assert!(!seq.is_empty());
            let mut last_end: Option<Timestamp> = None;
            for file in &seq {
                let start = file.ranges.iter().map(|(_, r)| r.start).min().unwrap();
                if let Some(end) = last_end {
                    prop_assert!(start > end);
                }
                last_end = file.max_end();
            }
        }

        #[test]
        fn generated_catalogues_validate(catalogue in catalogue_strategy(6, 6)) {
            let (seq, unseq) = catalogue.build();
            prop_assert!(MergeResource::new(&seq, &unseq).is_ok());
        }

        #[test]
        fn sealed_catalogues_have_no_open_files(catalogue in sealed_catalogue_strategy(6, 6)) {
            prop_assert!(!catalogue.has_open_files());
        }
    }

    #[test]
    fn open_layout_forgets_end_times() {
        let layout = FileLayout {
            id: 7,
            closed: false,
            measurements: 1,
            ranges: vec![(device_id(0), TimeRange::new(3, 9))],
        };
        let file = layout.build();
        assert!(!file.is_closed());
        assert_eq!(file.time_range(&device_id(0)).unwrap(), TimeRange::open(3));
    }
}
