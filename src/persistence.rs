//! Persistence gateway
//!
//! A [`PersistenceGateway`] owns one durable slot holding the whole record
//! set as a JSON array. [`JsonFileGateway`] keeps the slot in a file on disk;
//! [`MemoryGateway`] keeps it in memory for tests and storage-less runs.
//!
//! The JSON shape is a list of objects keyed `name`, `dob`, `age`,
//! `eligibility`, `voterId`, `phone`, `district`, `city`, `area`, `street`,
//! `pincode`, `address`.

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::record::VoterRecord;

/// Default storage file name.
pub const DEFAULT_DATA_FILE: &str = "voter_data.json";

/// Load/save contract for the durable record slot.
pub trait PersistenceGateway {
    /// Reads the stored record set.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<VoterRecord>>, StorageError>;

    /// Replaces the stored record set with `records`.
    fn save(&mut self, records: &[VoterRecord]) -> Result<(), StorageError>;

    /// Keeps a slot that [`load`](Self::load) could not read out of the way
    /// of the next save, returning where it went.
    ///
    /// Gateways that cannot hold unreadable data return `Ok(None)`.
    fn set_aside_unreadable(&mut self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }
}

impl PersistenceGateway for Box<dyn PersistenceGateway> {
    fn load(&self) -> Result<Option<Vec<VoterRecord>>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, records: &[VoterRecord]) -> Result<(), StorageError> {
        (**self).save(records)
    }

    fn set_aside_unreadable(&mut self) -> Result<Option<PathBuf>, StorageError> {
        (**self).set_aside_unreadable()
    }
}

/// Gateway storing the record set in a JSON file.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// reader never sees a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// `<file>.unreadable-<timestamp>` next to the data file.
    fn unreadable_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%dT%H%M%S");
        self.sibling(&format!(".unreadable-{}", stamp))
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn load(&self) -> Result<Option<Vec<VoterRecord>>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored records");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let records: Vec<VoterRecord> = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), records = records.len(), "loaded stored records");
        Ok(Some(records))
    }

    fn save(&mut self, records: &[VoterRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(records)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        info!(path = %self.path.display(), records = records.len(), "saved records");
        Ok(())
    }

    fn set_aside_unreadable(&mut self) -> Result<Option<PathBuf>, StorageError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let backup = self.unreadable_path();
        fs::rename(&self.path, &backup)?;
        warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            "moved unreadable data file aside"
        );
        Ok(Some(backup))
    }
}

/// Gateway keeping the slot in memory.
///
/// Can be switched into a failing mode where every save returns an I/O error.
#[derive(Debug, Default, Clone)]
pub struct MemoryGateway {
    slot: Option<Vec<VoterRecord>>,
    failing: bool,
    saves: usize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose slot already holds `records`.
    pub fn with_records(records: Vec<VoterRecord>) -> Self {
        Self {
            slot: Some(records),
            ..Self::default()
        }
    }

    /// A gateway that refuses every save.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// The currently stored records.
    pub fn stored(&self) -> Option<&[VoterRecord]> {
        self.slot.as_deref()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Option<Vec<VoterRecord>>, StorageError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, records: &[VoterRecord]) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Io(io::Error::other("storage slot is unavailable")));
        }
        self.slot = Some(records.to_vec());
        self.saves += 1;
        Ok(())
    }
}
