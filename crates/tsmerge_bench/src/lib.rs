//! Benchmark utilities.

use tsmerge_core::FileResource;
use tsmerge_testkit::FileBuilder;

/// Width of each sequential file's time window.
pub const WINDOW: i64 = 1_000;

/// Builds a sealed chain of `seq_files` files over `devices` devices and
/// `unseq_files` unsequential files spread evenly across it.
///
/// Unsequential file `i` lands inside sequential file `i * seq / unseq`, so
/// every one of them resolves somewhere along the chain.
pub fn catalogue(
    seq_files: usize,
    unseq_files: usize,
    devices: usize,
) -> (Vec<FileResource>, Vec<FileResource>) {
    let seq = (0..seq_files)
        .map(|i| {
            FileBuilder::new(i as u64)
                .points(i as i64 * WINDOW, WINDOW, devices)
                .measurements(8)
                .build()
        })
        .collect();
    let step = seq_files.max(1) as i64;
    let unseq = (0..unseq_files)
        .map(|i| {
            let target = i as i64 * step / unseq_files.max(1) as i64;
            FileBuilder::new((seq_files + i) as u64)
                .points(target * WINDOW + 10, WINDOW / 2, devices)
                .measurements(8)
                .build()
        })
        .collect();
    (seq, unseq)
}
