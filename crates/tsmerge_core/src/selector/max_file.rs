//! Greedy selector that merges as many files as the budget allows.

use crate::config::SelectorConfig;
use crate::error::MergeResult;
use crate::resource::{FileMetadata, FileResource, MergeResource};
use crate::selector::selection::{Selection, SelectionReport, StopReason};
use crate::selector::FileSelector;
use crate::stats::SelectorStats;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tsmerge_index::{TimeRange, Timestamp};

/// Selects the longest sequential prefix, together with every unsequential
/// file that prefix can absorb, that fits the budget and the cap.
///
/// ## Algorithm
///
/// A single left-to-right pass over the sequential files. Appending file `f`
/// to the prefix makes some pending unsequential files *resolvable*: every
/// device range they hold ends no later than the prefix reaches for that
/// device. Data older than the prefix therefore folds into its earliest
/// file. The last sequential candidate also absorbs anything newer than the
/// chain, since no later target exists this cycle.
///
/// `f` and the files it resolves form a group. The pass stops at the first
/// group that contains an open file, would exceed the cap, or would exceed
/// the budget. Groups are never skipped: the files a later group resolves
/// may depend on every sequential file before it.
///
/// Trailing sequential files that resolved nothing are dropped from the
/// result, and a pass that resolved no unsequential file yields
/// [`Selection::Empty`].
///
/// ## Example
///
/// ```rust,ignore
/// let selector = MaxFileSelector::new(
///     SelectorConfig::new().with_budget(64 << 20).with_max_unseq_files(10),
/// )?;
/// match selector.select(&resource)? {
///     Selection::Empty => { /* try again next cycle */ }
///     Selection::Chosen { seq_files, unseq_files } => executor.merge(seq_files, unseq_files)?,
/// }
/// ```
#[derive(Debug)]
pub struct MaxFileSelector {
    config: SelectorConfig,
    stats: SelectorStats,
}

/// An unsequential file with its metadata and cost resolved up front.
struct Candidate<'a> {
    file: &'a FileResource,
    metadata: Arc<FileMetadata>,
    cost: u64,
    closed: bool,
    committed: bool,
}

impl MaxFileSelector {
    /// Creates a selector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MergeError::InvalidConfig`] if `config` does not
    /// validate.
    pub fn new(config: SelectorConfig) -> MergeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: SelectorStats::new(),
        })
    }

    /// Returns the selector configuration.
    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Returns the selector's lifetime statistics.
    #[must_use]
    pub fn stats(&self) -> &SelectorStats {
        &self.stats
    }

    /// Selects files and reports how the pass ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource was released or its metadata is
    /// inconsistent.
    pub fn select_with_report<'a>(
        &self,
        resource: &MergeResource<'a>,
    ) -> MergeResult<(Selection<'a>, SelectionReport)> {
        let outcome = self.run(resource);
        match &outcome {
            Ok((Selection::Empty, _)) => self.stats.record_empty(),
            Ok((selection, _)) => self
                .stats
                .record_chosen(selection.seq_files().len(), selection.unseq_files().len()),
            Err(err) => {
                warn!(error = %err, "merge file selection failed");
                self.stats.record_error(err.is_data_integrity());
            }
        }
        outcome
    }

    fn file_cost(&self, file: &FileResource, metadata: &FileMetadata) -> u64 {
        self.config
            .cost_model
            .estimate(metadata.ranges.len(), file.measurement_count())
    }

    fn run<'a>(&self, resource: &MergeResource<'a>) -> MergeResult<(Selection<'a>, SelectionReport)> {
        let seq_files = resource.seq_files();
        let budget = self.config.budget;
        let cap = self.config.max_unseq_files;

        let mut candidates = Vec::with_capacity(resource.unseq_files().len());
        for &file in resource.unseq_files() {
            let metadata = resource.metadata(file)?;
            candidates.push(Candidate {
                file,
                cost: self.file_cost(file, &metadata),
                closed: resource.is_closed(file)?,
                metadata,
                committed: false,
            });
        }

        if candidates.is_empty() || cap == 0 {
            let stop_reason = if cap == 0 {
                StopReason::CapReached
            } else {
                StopReason::Exhausted
            };
            debug!(
                unseq_files = candidates.len(),
                cap,
                "nothing to fold into the sequential chain"
            );
            return Ok((Selection::Empty, empty_report(stop_reason, 0, 0)));
        }

        // Per device, the latest timestamp the committed prefix reaches.
        let mut reach: HashMap<String, Timestamp> = HashMap::new();
        let mut committed_unseq = 0usize;
        let mut cumulative_cost = 0u64;
        let mut prefix_len = 0usize;
        let mut useful_prefix_len = 0usize;
        let mut useful_cost = 0u64;
        let mut examined = 0usize;
        let mut stop_reason = StopReason::Exhausted;
        let tail = seq_files.len().saturating_sub(1);

        for (position, &seq_file) in seq_files.iter().enumerate() {
            examined += 1;

            if !resource.is_closed(seq_file)? {
                debug!(file = %seq_file, position, "sequential file is open");
                stop_reason = StopReason::OpenFile;
                break;
            }

            let metadata = resource.metadata(seq_file)?;
            let is_tail = position == tail;
            let resolved: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.committed && is_resolvable(c, &reach, &metadata, is_tail))
                .map(|(i, _)| i)
                .collect();

            let open_candidate = resolved
                .iter()
                .map(|&i| &candidates[i])
                .find(|c| !c.closed)
                .map(|c| c.file);
            if let Some(file) = open_candidate {
                debug!(file = %file, position, "unsequential file in group is open");
                stop_reason = StopReason::OpenFile;
                break;
            }

            if committed_unseq.saturating_add(resolved.len()) > cap {
                debug!(
                    position,
                    committed = committed_unseq,
                    group = resolved.len(),
                    cap,
                    "unsequential file cap reached"
                );
                stop_reason = StopReason::CapReached;
                break;
            }

            let group_cost = resolved
                .iter()
                .fold(self.file_cost(seq_file, &metadata), |acc, &i| {
                    acc.saturating_add(candidates[i].cost)
                });
            if cumulative_cost.saturating_add(group_cost) > budget {
                debug!(
                    position,
                    cumulative_cost,
                    group_cost,
                    budget,
                    "memory budget exceeded"
                );
                stop_reason = StopReason::BudgetExceeded;
                break;
            }

            cumulative_cost = cumulative_cost.saturating_add(group_cost);
            prefix_len = position + 1;
            for (device, range) in &metadata.ranges {
                let end = range.known_end();
                reach
                    .entry(device.clone())
                    .and_modify(|r| *r = (*r).max(end))
                    .or_insert(end);
            }
            for &i in &resolved {
                candidates[i].committed = true;
            }
            committed_unseq += resolved.len();
            if !resolved.is_empty() {
                useful_prefix_len = prefix_len;
                useful_cost = cumulative_cost;
            }

            debug!(
                file = %seq_file,
                position,
                resolved = resolved.len(),
                group_cost,
                cumulative_cost,
                "committed merge group"
            );
        }

        if committed_unseq == 0 {
            debug!(
                examined,
                stop_reason = %stop_reason,
                "no unsequential file became resolvable"
            );
            return Ok((
                Selection::Empty,
                empty_report(stop_reason, examined, prefix_len),
            ));
        }

        let seq_selected: Vec<&'a FileResource> = seq_files[..useful_prefix_len].to_vec();
        let unseq_selected: Vec<&'a FileResource> = candidates
            .iter()
            .filter(|c| c.committed)
            .map(|c| c.file)
            .collect();

        let report = SelectionReport {
            stop_reason,
            seq_examined: examined,
            total_cost: useful_cost,
            trimmed_seq_files: prefix_len - useful_prefix_len,
        };

        info!(
            seq_files = seq_selected.len(),
            unseq_files = unseq_selected.len(),
            total_cost = useful_cost,
            budget,
            stop_reason = %stop_reason,
            "selected merge files"
        );

        Ok((
            Selection::Chosen {
                seq_files: seq_selected,
                unseq_files: unseq_selected,
            },
            report,
        ))
    }
}

impl FileSelector for MaxFileSelector {
    fn select<'a>(&self, resource: &MergeResource<'a>) -> MergeResult<Selection<'a>> {
        self.select_with_report(resource)
            .map(|(selection, _)| selection)
    }
}

fn empty_report(stop_reason: StopReason, seq_examined: usize, trimmed: usize) -> SelectionReport {
    SelectionReport {
        stop_reason,
        seq_examined,
        total_cost: 0,
        trimmed_seq_files: trimmed,
    }
}

/// Returns true if every device range of `candidate` is accounted for once
/// `next` joins the prefix that already reaches `reach`.
///
/// An unknown end never resolves. At the tail of the chain every bounded
/// range resolves. A file without any data resolves only once it is sealed.
fn is_resolvable(
    candidate: &Candidate<'_>,
    reach: &HashMap<String, Timestamp>,
    next: &FileMetadata,
    is_tail: bool,
) -> bool {
    if !candidate.closed && candidate.metadata.ranges.is_empty() {
        return false;
    }
    candidate.metadata.ranges.iter().all(|(device, range)| {
        if !range.is_bounded() {
            return false;
        }
        if is_tail {
            return true;
        }
        let covered = reach
            .get(device)
            .copied()
            .max(next.ranges.get(device).map(TimeRange::known_end));
        covered.is_some_and(|covered| range.known_end() <= covered)
    })
}
