//! Per-cycle snapshot of merge candidates.

use crate::error::{MergeError, MergeResult};
use crate::resource::file::FileResource;
use crate::types::FileId;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use tsmerge_index::{IndexError, TimeRange, Timestamp};

/// Device ranges of one file, loaded once from its time index.
#[derive(Debug)]
pub(crate) struct FileMetadata {
    pub(crate) ranges: BTreeMap<String, TimeRange>,
}

impl FileMetadata {
    fn load(file: &FileResource) -> MergeResult<Self> {
        let index = file.time_index();
        index.validate().map_err(|e| match e {
            IndexError::InvalidRange { device, start, end } => MergeError::data_integrity(format!(
                "{} records [{start}, {end}] for device {device}, which ends before it starts",
                file.id()
            )),
            IndexError::UnknownDevice { device } => MergeError::unknown_device(file.id(), device),
        })?;

        let mut ranges = BTreeMap::new();
        for device in index.devices() {
            let range = index
                .time_range(&device)
                .map_err(|_| MergeError::unknown_device(file.id(), device.as_str()))?;
            ranges.insert(device, range);
        }
        Ok(Self { ranges })
    }

    /// Returns false only if every device ends at or before `bound`.
    fn outlives(&self, bound: Timestamp) -> bool {
        self.ranges.values().any(|r| !r.ends_at_or_before(bound))
    }
}

/// A snapshot of the files considered by one merge cycle.
///
/// The resource borrows files from the engine's catalogue and memoizes their
/// device ranges for its lifetime. It is built once per cycle, queried by a
/// selector, and then released.
///
/// # Invariants
///
/// - `seq_files` are in chronological order: for every device, ranges are
///   disjoint and strictly increasing along the list
/// - no file id appears twice across both lists
/// - after [`MergeResource::clear`], every query fails with
///   [`MergeError::ResourceReleased`]
///
/// Release happens on every exit path: `clear` runs on drop, and
/// [`MergeResource::scoped`] releases the resource before returning.
///
/// # Thread Safety
///
/// The metadata cache is behind a mutex, so a resource can be shared by
/// reference across threads. Clearing needs `&mut self` and therefore
/// cannot race with a selection in progress.
#[derive(Debug)]
pub struct MergeResource<'a> {
    seq_files: Vec<&'a FileResource>,
    unseq_files: Vec<&'a FileResource>,
    time_lower_bound: Option<Timestamp>,
    cache: Mutex<HashMap<FileId, Arc<FileMetadata>>>,
    cleared: bool,
}

impl<'a> MergeResource<'a> {
    /// Builds a resource over every given file.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::DataIntegrity`] if the sequential files overlap
    /// or are out of order, if a recorded range ends before it starts, or if
    /// a file id is listed twice.
    pub fn new(seq_files: &'a [FileResource], unseq_files: &'a [FileResource]) -> MergeResult<Self> {
        Self::build(seq_files.iter(), unseq_files.iter(), None)
    }

    /// Builds a resource, dropping files whose data all ends at or before
    /// `time_lower_bound`.
    ///
    /// Files that are still open are always kept: their end is unknown.
    ///
    /// # Errors
    ///
    /// Same as [`MergeResource::new`]. Validation covers the full input,
    /// including files the bound removes.
    pub fn with_time_lower_bound(
        seq_files: &'a [FileResource],
        unseq_files: &'a [FileResource],
        time_lower_bound: Timestamp,
    ) -> MergeResult<Self> {
        Self::build(seq_files.iter(), unseq_files.iter(), Some(time_lower_bound))
    }

    /// Builds a resource from borrowed files in catalogue order.
    ///
    /// # Errors
    ///
    /// Same as [`MergeResource::new`].
    pub fn build<S, U>(
        seq_files: S,
        unseq_files: U,
        time_lower_bound: Option<Timestamp>,
    ) -> MergeResult<Self>
    where
        S: IntoIterator<Item = &'a FileResource>,
        U: IntoIterator<Item = &'a FileResource>,
    {
        let seq: Vec<&'a FileResource> = seq_files.into_iter().collect();
        let unseq: Vec<&'a FileResource> = unseq_files.into_iter().collect();

        let mut seen = HashSet::with_capacity(seq.len() + unseq.len());
        let mut cache = HashMap::with_capacity(seq.len() + unseq.len());
        for file in seq.iter().chain(unseq.iter()) {
            if !seen.insert(file.id()) {
                return Err(integrity(format!("{} is listed more than once", file.id())));
            }
            let metadata = FileMetadata::load(file).map_err(|e| {
                warn!(file = %file.id(), error = %e, "rejecting merge snapshot");
                e
            })?;
            cache.insert(file.id(), Arc::new(metadata));
        }

        check_sequence_order(&seq, &cache)?;

        let retained = |file: &&'a FileResource| match time_lower_bound {
            Some(bound) => {
                !file.is_closed()
                    || cache
                        .get(&file.id())
                        .is_some_and(|metadata| metadata.outlives(bound))
            }
            None => true,
        };
        let seq_kept: Vec<&'a FileResource> = seq.iter().copied().filter(retained).collect();
        let unseq_kept: Vec<&'a FileResource> = unseq.iter().copied().filter(retained).collect();

        let kept_ids: HashSet<FileId> = seq_kept
            .iter()
            .chain(unseq_kept.iter())
            .map(|f| f.id())
            .collect();
        cache.retain(|id, _| kept_ids.contains(id));

        debug!(
            seq_files = seq_kept.len(),
            unseq_files = unseq_kept.len(),
            pruned = seq.len() + unseq.len() - kept_ids.len(),
            time_lower_bound = ?time_lower_bound,
            "built merge resource"
        );

        Ok(Self {
            seq_files: seq_kept,
            unseq_files: unseq_kept,
            time_lower_bound,
            cache: Mutex::new(cache),
            cleared: false,
        })
    }

    /// Builds a resource, runs `f` over it and releases it.
    ///
    /// The resource is cleared whatever `f` returns, including errors.
    ///
    /// # Errors
    ///
    /// Returns construction errors, or whatever `f` returns.
    pub fn scoped<S, U, T, F>(
        seq_files: S,
        unseq_files: U,
        time_lower_bound: Option<Timestamp>,
        f: F,
    ) -> MergeResult<T>
    where
        S: IntoIterator<Item = &'a FileResource>,
        U: IntoIterator<Item = &'a FileResource>,
        F: FnOnce(&MergeResource<'a>) -> MergeResult<T>,
    {
        let mut resource = Self::build(seq_files, unseq_files, time_lower_bound)?;
        let result = f(&resource);
        resource.clear();
        result
    }

    /// Returns the sequential candidates in chronological order.
    #[must_use]
    pub fn seq_files(&self) -> &[&'a FileResource] {
        &self.seq_files
    }

    /// Returns the unsequential candidates in catalogue order.
    #[must_use]
    pub fn unseq_files(&self) -> &[&'a FileResource] {
        &self.unseq_files
    }

    /// Returns the age cutoff applied at construction, if any.
    #[must_use]
    pub fn time_lower_bound(&self) -> Option<Timestamp> {
        self.time_lower_bound
    }

    /// Returns the recorded range of `device` in `file`.
    ///
    /// # Errors
    ///
    /// - [`MergeError::ResourceReleased`] after [`MergeResource::clear`]
    /// - [`MergeError::UnknownDevice`] if `file` records no such device
    pub fn device_time_range(&self, file: &FileResource, device: &str) -> MergeResult<TimeRange> {
        self.metadata(file)?
            .ranges
            .get(device)
            .copied()
            .ok_or_else(|| MergeError::unknown_device(file.id(), device))
    }

    /// Returns the devices `file` records, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ResourceReleased`] after [`MergeResource::clear`].
    pub fn devices(&self, file: &FileResource) -> MergeResult<Vec<String>> {
        Ok(self.metadata(file)?.ranges.keys().cloned().collect())
    }

    /// Returns whether `file` was sealed when the snapshot was taken.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ResourceReleased`] after [`MergeResource::clear`].
    pub fn is_closed(&self, file: &FileResource) -> MergeResult<bool> {
        self.ensure_live()?;
        Ok(file.is_closed())
    }

    /// Returns the number of files whose metadata is cached.
    #[must_use]
    pub fn cached_file_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true once the resource has been released.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Releases all cached metadata. Calling it again is a no-op.
    pub fn clear(&mut self) {
        if self.cleared {
            return;
        }
        self.cache.get_mut().clear();
        self.cleared = true;
        debug!(
            seq_files = self.seq_files.len(),
            unseq_files = self.unseq_files.len(),
            "released merge resource"
        );
    }

    pub(crate) fn metadata(&self, file: &FileResource) -> MergeResult<Arc<FileMetadata>> {
        self.ensure_live()?;
        let mut cache = self.cache.lock();
        if let Some(metadata) = cache.get(&file.id()) {
            return Ok(Arc::clone(metadata));
        }
        let metadata = Arc::new(FileMetadata::load(file)?);
        cache.insert(file.id(), Arc::clone(&metadata));
        Ok(metadata)
    }

    fn ensure_live(&self) -> MergeResult<()> {
        if self.cleared {
            return Err(MergeError::ResourceReleased);
        }
        Ok(())
    }
}

impl Drop for MergeResource<'_> {
    fn drop(&mut self) {
        self.clear();
    }
}

fn integrity(message: String) -> MergeError {
    warn!(%message, "rejecting merge snapshot");
    MergeError::data_integrity(message)
}

/// Checks that, per device, sequential ranges are disjoint and increasing.
///
/// An open file contributes the last timestamp it is known to hold.
fn check_sequence_order(
    seq: &[&FileResource],
    cache: &HashMap<FileId, Arc<FileMetadata>>,
) -> MergeResult<()> {
    let mut last_seen: HashMap<&str, (Timestamp, FileId)> = HashMap::new();
    for file in seq {
        let Some(metadata) = cache.get(&file.id()) else {
            continue;
        };
        for (device, range) in &metadata.ranges {
            if let Some(&(prev_end, prev_file)) = last_seen.get(device.as_str()) {
                if range.start <= prev_end {
                    return Err(integrity(format!(
                        "sequential {} starts device {} at {}, not after {} recorded by {}",
                        file.id(),
                        device,
                        range.start,
                        prev_end,
                        prev_file
                    )));
                }
            }
            last_seen.insert(device.as_str(), (range.known_end(), file.id()));
        }
    }
    Ok(())
}
