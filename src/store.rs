//! Record store
//!
//! The authoritative, ordered, in-memory collection of voter records for a
//! session. Insertion order is display order. Records can be addressed by
//! position, which shifts when earlier records are deleted, or by the
//! [`RecordId`] assigned when the record entered the store, which does not.

use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::VoterRecord;

/// Stable identifier of a record within a session.
///
/// Ids are generated when a record is added, loaded or imported and are not
/// persisted, so they are only meaningful for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record together with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: VoterRecord,
}

/// Ordered, mutable collection of voter records.
///
/// All operations are synchronous. There is a single owner; callers must not
/// keep positions across a [`delete`](RecordStore::delete) or
/// [`replace_all`](RecordStore::replace_all).
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    entries: Vec<StoredRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `records` in order, each with a new id.
    pub fn from_records(records: Vec<VoterRecord>) -> Self {
        let mut store = Self::new();
        store.replace_all(records);
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a record and returns its position.
    pub fn add(&mut self, record: VoterRecord) -> usize {
        let id = RecordId::new();
        self.entries.push(StoredRecord { id, record });
        let position = self.entries.len() - 1;
        debug!(%id, position, "record added");
        position
    }

    /// Replaces the record at `position`. The record keeps its id.
    pub fn update(&mut self, position: usize, record: VoterRecord) -> Result<(), StoreError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(position)
            .ok_or(StoreError::OutOfRange { position, len })?;
        entry.record = record;
        debug!(id = %entry.id, position, "record updated");
        Ok(())
    }

    /// Removes and returns the record at `position`.
    ///
    /// Every later record moves down by one position.
    pub fn delete(&mut self, position: usize) -> Result<VoterRecord, StoreError> {
        if position >= self.entries.len() {
            return Err(StoreError::OutOfRange {
                position,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(position);
        debug!(id = %removed.id, position, "record deleted");
        Ok(removed.record)
    }

    /// Discards all records and stores `records` in their place.
    ///
    /// The new contents are built before the old ones are dropped, so no
    /// partially replaced state is ever visible.
    pub fn replace_all(&mut self, records: Vec<VoterRecord>) {
        let entries: Vec<StoredRecord> = records
            .into_iter()
            .map(|record| StoredRecord {
                id: RecordId::new(),
                record,
            })
            .collect();
        debug!(
            previous = self.entries.len(),
            current = entries.len(),
            "store replaced"
        );
        self.entries = entries;
    }

    /// Returns a copy of all records in order.
    pub fn snapshot(&self) -> Vec<VoterRecord> {
        self.records().cloned().collect()
    }

    /// Iterates over the records in order.
    pub fn records(&self) -> impl Iterator<Item = &VoterRecord> + '_ {
        self.entries.iter().map(|e| &e.record)
    }

    /// All records with their ids, in order.
    pub fn entries(&self) -> &[StoredRecord] {
        &self.entries
    }

    /// Id of the record at `position`.
    pub fn id_at(&self, position: usize) -> Option<RecordId> {
        self.entries.get(position).map(|e| e.id)
    }

    /// Current position of the record with `id`.
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: RecordId) -> Option<&VoterRecord> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.record)
    }

    /// Replaces the record with `id`.
    pub fn update_by_id(&mut self, id: RecordId, record: VoterRecord) -> Result<(), StoreError> {
        let position = self.position_of(id).ok_or(StoreError::UnknownId(id))?;
        self.update(position, record)
    }

    /// Removes and returns the record with `id`.
    pub fn delete_by_id(&mut self, id: RecordId) -> Result<VoterRecord, StoreError> {
        let position = self.position_of(id).ok_or(StoreError::UnknownId(id))?;
        self.delete(position)
    }
}
