//! Integration tests for merge file selection over realistic catalogues.

use tsmerge_core::{
    FileResource, FileSelector, MaxFileSelector, MergeError, MergeResource, Selection,
    SelectorConfig, StopReason,
};
use tsmerge_index::TimeRange;
use tsmerge_testkit::{
    device_id, point_chain, two_group_files, FileBuilder, StandardFiles, DEVICE_COUNT,
    MEASUREMENT_COUNT,
};

fn ids(files: &[&FileResource]) -> Vec<u64> {
    files.iter().map(|f| f.id().as_u64()).collect()
}

fn all_ids(files: &[FileResource]) -> Vec<u64> {
    files.iter().map(|f| f.id().as_u64()).collect()
}

fn selector(budget: u64) -> MaxFileSelector {
    MaxFileSelector::new(SelectorConfig::new().with_budget(budget)).unwrap()
}

fn unlimited() -> MaxFileSelector {
    MaxFileSelector::new(SelectorConfig::unlimited()).unwrap()
}

#[test]
fn unlimited_budget_selects_everything() {
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq, &files.unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), all_ids(&files.seq));
    assert_eq!(ids(selection.unseq_files()), all_ids(&files.unseq));
}

#[test]
fn single_seq_file_absorbs_every_unseq_file() {
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq[..1], &files.unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![0]);
    assert_eq!(ids(selection.unseq_files()), all_ids(&files.unseq));
}

#[test]
fn single_unseq_file_needs_only_first_seq_file() {
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq, &files.unseq[..1]).unwrap();

    let (selection, report) = unlimited().select_with_report(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![0]);
    assert_eq!(ids(selection.unseq_files()), vec![100]);
    assert_eq!(report.trimmed_seq_files, 4);
}

#[test]
fn tiny_budget_selects_nothing() {
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq, &files.unseq).unwrap();

    let (selection, report) = selector(1).select_with_report(&resource).unwrap();
    assert_eq!(selection, Selection::Empty);
    assert_eq!(report.stop_reason, StopReason::BudgetExceeded);
    assert_eq!(report.seq_examined, 1);
}

#[test]
fn budget_admits_four_groups() {
    // Each standard file costs 4096 + 10 * (64 + 10 * 400) = 44_736,
    // so a seq/unseq pair costs 89_472 and four pairs fit in 400_000.
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq, &files.unseq).unwrap();

    let (selection, report) = selector(400_000).select_with_report(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![0, 1, 2, 3]);
    assert_eq!(ids(selection.unseq_files()), vec![100, 101, 102, 103]);
    assert_eq!(report.stop_reason, StopReason::BudgetExceeded);
    assert_eq!(report.total_cost, 4 * 89_472);
}

#[test]
fn open_seq_file_blocks_a_spanning_unseq_file() {
    let mut files = StandardFiles::new();
    files.seq[1].mark_open();
    let unseq = vec![StandardFiles::unseq_span(10, 0, 500)];

    let resource = MergeResource::new(&files.seq, &unseq).unwrap();
    let (selection, report) = unlimited().select_with_report(&resource).unwrap();
    assert!(selection.is_empty());
    assert_eq!(report.stop_reason, StopReason::OpenFile);
}

#[test]
fn time_lower_bound_before_all_data_keeps_every_file() {
    let mut files = StandardFiles::new();
    files.seq[1].mark_open();
    let unseq = vec![StandardFiles::unseq_span(10, 0, 500)];

    let resource = MergeResource::with_time_lower_bound(&files.seq, &unseq, i64::MIN).unwrap();
    assert_eq!(resource.seq_files().len(), 5);
    assert_eq!(resource.unseq_files().len(), 1);
    assert!(unlimited().select(&resource).unwrap().is_empty());
}

#[test]
fn time_lower_bound_prunes_expired_files() {
    let files = StandardFiles::new();
    let resource = MergeResource::with_time_lower_bound(&files.seq, &files.unseq, 199).unwrap();
    assert_eq!(ids(resource.seq_files()), vec![2, 3, 4]);
    assert_eq!(ids(resource.unseq_files()), vec![102, 103, 104]);

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![2, 3, 4]);
    assert_eq!(ids(selection.unseq_files()), vec![102, 103, 104]);
}

#[test]
fn unseq_file_crossing_a_boundary_pulls_in_next_seq_file() {
    let files = StandardFiles::new();
    let unseq = vec![StandardFiles::unseq_span(10, 0, 101)];
    let resource = MergeResource::new(&files.seq, &unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![0, 1]);
    assert_eq!(ids(selection.unseq_files()), vec![10]);
}

#[test]
fn budget_stops_continuous_point_chain() {
    // One device with ten measurements: 4096 + 64 + 4000 = 8_160 per file.
    let seq = point_chain(0..99, 1, MEASUREMENT_COUNT);
    let unseq: Vec<FileResource> = [(0, 0), (0, 99), (99, 99)]
        .into_iter()
        .enumerate()
        .map(|(i, (start, end))| {
            FileBuilder::new(200 + i as u64)
                .range(device_id(0), start, end)
                .measurements(MEASUREMENT_COUNT)
                .build()
        })
        .collect();
    let selector = selector(29_000);

    let resource = MergeResource::new(&seq, &unseq).unwrap();
    let (selection, report) = selector.select_with_report(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![0]);
    assert_eq!(ids(selection.unseq_files()), vec![200]);
    assert_eq!(report.stop_reason, StopReason::BudgetExceeded);

    let rest = MergeResource::new(&seq[1..], &unseq[1..]).unwrap();
    assert!(selector.select(&rest).unwrap().is_empty());
}

#[test]
fn old_points_fold_into_first_seq_file() {
    let seq = point_chain(11..16, DEVICE_COUNT, MEASUREMENT_COUNT);
    let unseq: Vec<FileResource> = (0..10)
        .map(|t| {
            FileBuilder::new(100 + t as u64)
                .points(t, 1, DEVICE_COUNT)
                .measurements(MEASUREMENT_COUNT)
                .build()
        })
        .collect();
    let resource = MergeResource::new(&seq, &unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![11]);
    assert_eq!(selection.unseq_files().len(), 10);
}

#[test]
fn one_old_unseq_file_selects_one_seq_file() {
    let seq = point_chain(11..16, DEVICE_COUNT, MEASUREMENT_COUNT);
    let unseq = vec![StandardFiles::unseq_span(100, 0, 10)];
    let resource = MergeResource::new(&seq, &unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![11]);
    assert_eq!(ids(selection.unseq_files()), vec![100]);
}

fn interleaved_unseq(spans: &[(i64, i64)]) -> Vec<FileResource> {
    spans
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| StandardFiles::unseq_span(100 + i as u64, start, end - start + 1))
        .collect()
}

#[test]
fn interleaved_unseq_files_select_minimal_prefix() {
    let seq = point_chain(11..16, DEVICE_COUNT, MEASUREMENT_COUNT);
    let unseq = interleaved_unseq(&[(7, 9), (10, 13)]);
    let resource = MergeResource::new(&seq, &unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![11, 12, 13]);
    assert_eq!(ids(selection.unseq_files()), vec![100, 101]);
}

#[test]
fn last_seq_file_absorbs_data_past_the_chain() {
    let seq = point_chain(11..16, DEVICE_COUNT, MEASUREMENT_COUNT);
    let unseq = interleaved_unseq(&[(7, 9), (10, 13), (14, 16), (17, 18)]);
    let resource = MergeResource::new(&seq, &unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![11, 12, 13, 14, 15]);
    assert_eq!(ids(selection.unseq_files()), vec![100, 101, 102, 103]);
}

#[test]
fn open_seq_file_truncates_interleaved_selection() {
    let mut seq = point_chain(11..16, DEVICE_COUNT, MEASUREMENT_COUNT);
    seq[3].mark_open();
    let unseq = interleaved_unseq(&[(7, 9), (10, 13), (14, 16), (17, 18)]);
    let resource = MergeResource::new(&seq, &unseq).unwrap();

    let (selection, report) = unlimited().select_with_report(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![11, 12, 13]);
    assert_eq!(ids(selection.unseq_files()), vec![100, 101]);
    assert_eq!(report.stop_reason, StopReason::OpenFile);
}

#[test]
fn per_device_ends_decide_resolution() {
    let (seq, unseq) = two_group_files();
    let resource = MergeResource::new(&seq, &unseq).unwrap();

    let selection = unlimited().select(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![1, 2]);
    assert_eq!(ids(selection.unseq_files()), vec![3, 4]);
}

#[test]
fn unseq_cap_limits_groups() {
    let (seq, unseq) = two_group_files();
    let resource = MergeResource::new(&seq, &unseq).unwrap();
    let selector =
        MaxFileSelector::new(SelectorConfig::unlimited().with_max_unseq_files(1)).unwrap();

    let (selection, report) = selector.select_with_report(&resource).unwrap();
    assert_eq!(ids(selection.seq_files()), vec![1]);
    assert_eq!(ids(selection.unseq_files()), vec![3]);
    assert_eq!(report.stop_reason, StopReason::CapReached);
}

#[test]
fn selection_is_repeatable() {
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq, &files.unseq).unwrap();
    let selector = selector(400_000);

    let first = selector.select(&resource).unwrap();
    let second = selector.select(&resource).unwrap();
    assert_eq!(first, second);
    assert_eq!(selector.stats().chosen_selections(), 2);
}

#[test]
fn scoped_resource_is_released() {
    let files = StandardFiles::new();
    let selector = unlimited();
    let chosen = MergeResource::scoped(&files.seq, &files.unseq, None, |resource| {
        assert_eq!(resource.cached_file_count(), 10);
        selector.select(resource).map(|s| s.file_count())
    })
    .unwrap();
    assert_eq!(chosen, 10);
}

#[test]
fn cleared_resource_rejects_selection() {
    let files = StandardFiles::new();
    let mut resource = MergeResource::new(&files.seq, &files.unseq).unwrap();
    resource.clear();
    resource.clear();
    assert!(resource.is_cleared());
    assert!(matches!(
        unlimited().select(&resource),
        Err(MergeError::ResourceReleased)
    ));
}

#[test]
fn overlapping_seq_files_are_rejected() {
    let seq = vec![
        FileBuilder::new(0).range(device_id(0), 0, 10).build(),
        FileBuilder::new(1).range(device_id(0), 10, 20).build(),
    ];
    let err = MergeResource::new(&seq, &[]).unwrap_err();
    assert!(err.is_data_integrity());
}

#[test]
fn inverted_range_is_rejected() {
    let seq = vec![FileBuilder::new(0).range(device_id(0), 0, 10).build()];
    let unseq = vec![FileBuilder::new(1).range(device_id(0), 9, 3).build()];
    assert!(matches!(
        MergeResource::new(&seq, &unseq),
        Err(MergeError::DataIntegrity { .. })
    ));
}

#[test]
fn device_ranges_are_served_from_the_snapshot() {
    let files = StandardFiles::new();
    let resource = MergeResource::new(&files.seq, &files.unseq).unwrap();
    assert_eq!(
        resource
            .device_time_range(&files.unseq[2], &device_id(5))
            .unwrap(),
        TimeRange::new(200, 259)
    );
    assert_eq!(resource.devices(&files.seq[0]).unwrap().len(), DEVICE_COUNT);
    assert!(matches!(
        resource.device_time_range(&files.seq[0], "root.other"),
        Err(MergeError::UnknownDevice { .. })
    ));
}
