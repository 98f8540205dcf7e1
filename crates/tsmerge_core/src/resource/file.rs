//! Catalogue metadata of a single data file.

use crate::error::{MergeError, MergeResult};
use crate::types::{FileId, FileVersion};
use std::fmt;
use tsmerge_index::{TimeIndex, TimeRange, Timestamp};

/// One physical data file as the storage engine's catalogue sees it.
///
/// A file starts out open while the engine writes into it; its time index
/// grows with every write. Once sealed, it is immutable and becomes a merge
/// candidate. Open files are never selected.
///
/// Two resources are equal when they carry the same id and version.
pub struct FileResource {
    id: FileId,
    version: FileVersion,
    closed: bool,
    measurement_count: u32,
    time_index: Box<dyn TimeIndex>,
}

impl FileResource {
    /// Creates an open file backed by `time_index`.
    pub fn new(id: FileId, version: FileVersion, time_index: impl TimeIndex + 'static) -> Self {
        Self {
            id,
            version,
            closed: false,
            measurement_count: 1,
            time_index: Box::new(time_index),
        }
    }

    /// Creates a sealed file backed by `time_index`.
    pub fn sealed(id: FileId, version: FileVersion, time_index: impl TimeIndex + 'static) -> Self {
        let mut file = Self::new(id, version, time_index);
        file.closed = true;
        file
    }

    /// Sets the number of measurements each device holds.
    #[must_use]
    pub fn with_measurement_count(mut self, count: u32) -> Self {
        self.measurement_count = count;
        self
    }

    /// Returns the file id.
    #[must_use]
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Returns the file version.
    #[must_use]
    pub fn version(&self) -> FileVersion {
        self.version
    }

    /// Returns true if the file is sealed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the number of measurements per device.
    #[must_use]
    pub fn measurement_count(&self) -> u32 {
        self.measurement_count
    }

    /// Returns the number of devices the file records.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.time_index.device_count()
    }

    /// Returns the file's time index.
    #[must_use]
    pub fn time_index(&self) -> &dyn TimeIndex {
        self.time_index.as_ref()
    }

    /// Returns the recorded range of `device`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownDevice`] if the file holds no data for
    /// `device`.
    pub fn time_range(&self, device: &str) -> MergeResult<TimeRange> {
        self.time_index
            .time_range(device)
            .map_err(|_| MergeError::unknown_device(self.id, device))
    }

    /// Seals the file. Its time ranges are frozen from now on.
    pub fn mark_closed(&mut self) {
        self.closed = true;
    }

    /// Reopens the file for writing.
    ///
    /// End times recorded so far are dropped: a file being written only
    /// knows where its data starts.
    pub fn mark_open(&mut self) {
        self.closed = false;
        self.time_index.clear_end_times();
    }

    /// Records a write at `time` for `device`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::FileSealed`] if the file is closed.
    pub fn record_write(&mut self, device: &str, time: Timestamp) -> MergeResult<()> {
        self.update_start_time(device, time)?;
        self.update_end_time(device, time)
    }

    /// Lowers the start time of `device` to `time` if it is earlier.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::FileSealed`] if the file is closed.
    pub fn update_start_time(&mut self, device: &str, time: Timestamp) -> MergeResult<()> {
        self.ensure_open()?;
        self.time_index.update_start_time(device, time);
        Ok(())
    }

    /// Raises the end time of `device` to `time` if it is later.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::FileSealed`] if the file is closed.
    pub fn update_end_time(&mut self, device: &str, time: Timestamp) -> MergeResult<()> {
        self.ensure_open()?;
        self.time_index.update_end_time(device, time);
        Ok(())
    }

    fn ensure_open(&self) -> MergeResult<()> {
        if self.closed {
            return Err(MergeError::FileSealed { file: self.id });
        }
        Ok(())
    }
}

impl PartialEq for FileResource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version == other.version
    }
}

impl Eq for FileResource {}

impl fmt::Debug for FileResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileResource")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("closed", &self.closed)
            .field("devices", &self.time_index.device_count())
            .finish()
    }
}

impl fmt::Display for FileResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)?;
        if !self.closed {
            write!(f, " (open)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsmerge_index::DeviceTimeIndex;

    fn open_file() -> FileResource {
        FileResource::new(FileId::new(1), FileVersion::new(1), DeviceTimeIndex::new())
    }

    #[test]
    fn new_file_is_open() {
        let file = open_file();
        assert!(!file.is_closed());
        assert_eq!(file.device_count(), 0);
    }

    #[test]
    fn writes_grow_ranges_until_sealed() {
        let mut file = open_file();
        file.record_write("d0", 5).unwrap();
        file.record_write("d0", 9).unwrap();
        assert_eq!(file.time_range("d0").unwrap(), TimeRange::new(5, 9));

        file.mark_closed();
        assert!(matches!(
            file.record_write("d0", 10),
            Err(MergeError::FileSealed { .. })
        ));
        assert_eq!(file.time_range("d0").unwrap(), TimeRange::new(5, 9));
    }

    #[test]
    fn reopening_forgets_end_times() {
        let mut file = FileResource::sealed(
            FileId::new(2),
            FileVersion::new(2),
            DeviceTimeIndex::from_ranges([("d0", TimeRange::new(100, 199))]),
        );
        file.mark_open();
        assert!(!file.is_closed());
        assert_eq!(file.time_range("d0").unwrap(), TimeRange::open(100));
    }

    #[test]
    fn unknown_device_names_the_file() {
        let file = open_file();
        match file.time_range("d9") {
            Err(MergeError::UnknownDevice { file: id, device }) => {
                assert_eq!(id, FileId::new(1));
                assert_eq!(device, "d9");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn equality_is_identity() {
        let a = FileResource::sealed(FileId::new(3), FileVersion::new(1), DeviceTimeIndex::new());
        let b = FileResource::sealed(
            FileId::new(3),
            FileVersion::new(1),
            DeviceTimeIndex::from_ranges([("d0", TimeRange::point(1))]),
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "file:3@v1");
        assert_eq!(open_file().to_string(), "file:1@v1 (open)");
    }
}
