//! JSON catalogue snapshots.
//!
//! A snapshot lists the sequential chain and the unsequential files of one
//! storage group as the engine's catalogue saw them:
//!
//! ```json
//! {
//!   "seq": [
//!     { "id": 0, "devices": { "root.sg.d0": { "start": 0, "end": 99 } } }
//!   ],
//!   "unseq": [
//!     { "id": 7, "closed": false, "devices": { "root.sg.d0": { "start": 10, "end": null } } }
//!   ]
//! }
//! ```
//!
//! `version` defaults to the id, `closed` to true, `measurements` to 1 and
//! `index` to `"device"`. Unsequential files with `"index": "file"` keep a
//! single coarse range for all their devices; sequential files must carry
//! per-device ranges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tsmerge_core::{FileId, FileResource, FileVersion};
use tsmerge_index::{DeviceTimeIndex, FileTimeIndex, TimeRange};

/// Errors raised while loading a catalogue snapshot.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The snapshot could not be read.
    #[error("cannot read catalogue {path:?}: {source}")]
    Io {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for the expected layout.
    #[error("malformed catalogue {path:?}: {source}")]
    Parse {
        /// Snapshot path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// A file entry cannot be turned into a file resource.
    #[error("invalid file entry {id}: {message}")]
    InvalidEntry {
        /// Id of the offending entry.
        id: u64,
        /// Description of the problem.
        message: String,
    },
}

/// Time index granularity of a file entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// One range per device.
    #[default]
    Device,
    /// One range for the whole file.
    File,
}

/// One file of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File id.
    pub id: u64,
    /// File version; defaults to the id.
    #[serde(default)]
    pub version: Option<u64>,
    /// Whether the file is sealed.
    #[serde(default = "default_closed")]
    pub closed: bool,
    /// Measurements per device.
    #[serde(default = "default_measurements")]
    pub measurements: u32,
    /// Time index granularity.
    #[serde(default)]
    pub index: IndexKind,
    /// Device ranges.
    #[serde(default)]
    pub devices: BTreeMap<String, TimeRange>,
}

fn default_closed() -> bool {
    true
}

fn default_measurements() -> u32 {
    1
}

impl FileEntry {
    /// Builds the file resource this entry describes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::InvalidEntry`] if a sealed file records a
    /// range without an end.
    pub fn to_resource(&self) -> Result<FileResource, CatalogueError> {
        if self.closed {
            if let Some((device, _)) = self.devices.iter().find(|(_, r)| r.end.is_none()) {
                return Err(CatalogueError::InvalidEntry {
                    id: self.id,
                    message: format!("sealed file has no end time for device {device}"),
                });
            }
        }

        let id = FileId::new(self.id);
        let version = FileVersion::new(self.version.unwrap_or(self.id));
        let devices = DeviceTimeIndex::from_ranges(self.devices.clone());
        let file = match (self.index, self.closed) {
            (IndexKind::Device, true) => FileResource::sealed(id, version, devices),
            (IndexKind::Device, false) => FileResource::new(id, version, devices),
            (IndexKind::File, closed) => {
                let coarse = FileTimeIndex::degrade(&devices).map_err(|e| {
                    CatalogueError::InvalidEntry {
                        id: self.id,
                        message: e.to_string(),
                    }
                })?;
                if closed {
                    FileResource::sealed(id, version, coarse)
                } else {
                    FileResource::new(id, version, coarse)
                }
            }
        };
        Ok(file.with_measurement_count(self.measurements))
    }
}

/// A catalogue snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    /// Sequential files in chronological order.
    #[serde(default)]
    pub seq: Vec<FileEntry>,
    /// Unsequential files in catalogue order.
    #[serde(default)]
    pub unseq: Vec<FileEntry>,
}

impl Catalogue {
    /// Reads a snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CatalogueError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds `(seq_files, unseq_files)`.
    ///
    /// # Errors
    ///
    /// Returns the first entry that cannot be built, or
    /// [`CatalogueError::InvalidEntry`] for a sequential entry with a coarse
    /// index.
    pub fn to_resources(&self) -> Result<(Vec<FileResource>, Vec<FileResource>), CatalogueError> {
        let seq = self
            .seq
            .iter()
            .map(|entry| {
                if entry.index == IndexKind::File {
                    return Err(CatalogueError::InvalidEntry {
                        id: entry.id,
                        message: "sequential file needs a per-device index".to_string(),
                    });
                }
                entry.to_resource()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let unseq = self
            .unseq
            .iter()
            .map(FileEntry::to_resource)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((seq, unseq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_catalogue(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_are_applied() {
        let file = write_catalogue(
            r#"{ "seq": [ { "id": 3, "devices": { "d0": { "start": 0, "end": 9 } } } ] }"#,
        );
        let catalogue = Catalogue::load(file.path()).unwrap();
        assert!(catalogue.unseq.is_empty());

        let entry = &catalogue.seq[0];
        assert!(entry.closed);
        assert_eq!(entry.measurements, 1);
        assert_eq!(entry.index, IndexKind::Device);

        let resource = entry.to_resource().unwrap();
        assert!(resource.is_closed());
        assert_eq!(resource.version(), FileVersion::new(3));
        assert_eq!(resource.time_range("d0").unwrap(), TimeRange::new(0, 9));
    }

    #[test]
    fn file_index_collapses_devices() {
        let entry = FileEntry {
            id: 1,
            version: None,
            closed: true,
            measurements: 2,
            index: IndexKind::File,
            devices: BTreeMap::from([
                ("d0".to_string(), TimeRange::new(0, 5)),
                ("d1".to_string(), TimeRange::new(3, 12)),
            ]),
        };
        let resource = entry.to_resource().unwrap();
        assert_eq!(resource.time_range("d0").unwrap(), TimeRange::new(0, 12));
        assert_eq!(resource.time_range("d1").unwrap(), TimeRange::new(0, 12));
    }

    #[test]
    fn coarse_sequential_file_is_rejected() {
        let file = write_catalogue(
            r#"{
                "seq": [
                    { "id": 0, "index": "file",
                      "devices": { "d0": { "start": 0, "end": 9 }, "d1": { "start": 100, "end": 109 } } },
                    { "id": 1, "devices": { "d0": { "start": 10, "end": 19 } } }
                ],
                "unseq": [
                    { "id": 5, "index": "file", "devices": { "d0": { "start": 3, "end": 12 } } }
                ]
            }"#,
        );
        let catalogue = Catalogue::load(file.path()).unwrap();
        assert!(matches!(
            catalogue.to_resources(),
            Err(CatalogueError::InvalidEntry { id: 0, .. })
        ));

        let mut unseq_only = catalogue.clone();
        unseq_only.seq[0].index = IndexKind::Device;
        let (seq, unseq) = unseq_only.to_resources().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(unseq[0].time_range("d0").unwrap(), TimeRange::new(3, 12));
    }

    #[test]
    fn sealed_file_needs_end_times() {
        let file = write_catalogue(
            r#"{ "unseq": [ { "id": 4, "devices": { "d0": { "start": 0, "end": null } } } ] }"#,
        );
        let catalogue = Catalogue::load(file.path()).unwrap();
        assert!(matches!(
            catalogue.to_resources(),
            Err(CatalogueError::InvalidEntry { id: 4, .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let file = write_catalogue("{ not json");
        assert!(matches!(
            Catalogue::load(file.path()),
            Err(CatalogueError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Catalogue::load(&dir.path().join("missing.json")),
            Err(CatalogueError::Io { .. })
        ));
    }
}
