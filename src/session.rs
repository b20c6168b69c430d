//! Session
//!
//! [`Session`] is the single owner of the application state: the record
//! store, the view state and the persistence gateway, together with the
//! flags that decide when the store is written back. The CLI and the
//! terminal browser drive everything through it.
//!
//! # Persistence
//!
//! With `auto_persist` on, every mutation writes the whole record set through
//! the gateway. If such a write fails the session logs one warning, marks
//! storage unavailable and keeps working in memory; later automatic writes
//! are skipped. An explicit [`Session::save`] always tries again and reports
//! failure to the caller. With `auto_persist` off, mutations only mark the
//! session dirty and [`Session::flush_on_exit`] writes them out.

use chrono::{Local, NaiveDate};
use std::path::Path;
use tracing::{error, info, warn};

use crate::csv_handler::{
    encode, CsvDecoder, CsvExporter, DecodeOutcome, ExportStats, HeaderPolicy,
};
use crate::error::{StoreError, VoterRegistryError};
use crate::persistence::PersistenceGateway;
use crate::record::VoterRecord;
use crate::store::{RecordId, RecordStore};
use crate::validator::validate_record;
use crate::view::{Page, ViewState, DEFAULT_ROWS_PER_PAGE};

/// Settings a session is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Write through the gateway after every mutation.
    pub auto_persist: bool,
    pub rows_per_page: usize,
    pub header_policy: HeaderPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            auto_persist: true,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            header_policy: HeaderPolicy::default(),
        }
    }
}

/// What an import would do, shown to the user before the store is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPreview {
    /// Records the file decoded into.
    pub incoming: usize,
    /// Data lines dropped for having too few fields.
    pub skipped: usize,
    /// Records currently in the store that would be discarded.
    pub existing: usize,
}

/// Result of [`Session::import_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The store now holds exactly the imported records.
    Imported { count: usize, skipped: usize },
    /// The confirmation was declined; nothing changed.
    Cancelled,
}

/// Application state for one run.
pub struct Session<G> {
    store: RecordStore,
    view: ViewState,
    gateway: G,
    auto_persist: bool,
    header_policy: HeaderPolicy,
    storage_available: bool,
    dirty: bool,
    reference_date: Option<NaiveDate>,
}

impl<G: PersistenceGateway> Session<G> {
    /// Opens a session, loading the stored record set through `gateway`.
    ///
    /// Absent storage yields an empty store. Unreadable or corrupt storage
    /// also yields an empty store, with a warning logged, and the unreadable
    /// data is set aside before anything is written over it. If it cannot be
    /// set aside, automatic saving starts disabled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `options.rows_per_page` is zero.
    pub fn open(mut gateway: G, options: SessionOptions) -> Result<Self, VoterRegistryError> {
        let view = ViewState::new(options.rows_per_page)?;
        let mut storage_available = true;
        let records = match gateway.load() {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "stored records could not be loaded, starting empty");
                if let Err(e) = gateway.set_aside_unreadable() {
                    warn!(
                        error = %e,
                        "unreadable stored records could not be set aside, \
                         automatic saving is disabled"
                    );
                    storage_available = false;
                }
                Vec::new()
            }
        };
        info!(records = records.len(), "session opened");

        let store = RecordStore::from_records(records);
        let mut session = Self {
            store,
            view,
            gateway,
            auto_persist: options.auto_persist,
            header_policy: options.header_policy,
            storage_available,
            dirty: false,
            reference_date: None,
        };
        session.view.refresh(&session.store);
        Ok(session)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn auto_persist(&self) -> bool {
        self.auto_persist
    }

    /// False after an automatic write failed, until an explicit save succeeds.
    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    /// True when the store has changes the gateway has not stored.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn header_policy(&self) -> HeaderPolicy {
        self.header_policy
    }

    /// Changes how the header of later imports is checked.
    pub fn set_header_policy(&mut self, header_policy: HeaderPolicy) {
        self.header_policy = header_policy;
    }

    /// Date used to reject future dates of birth.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Fixes the date returned by [`today`](Self::today).
    pub fn set_reference_date(&mut self, date: NaiveDate) {
        self.reference_date = Some(date);
    }

    /// Validates and appends a record, returning its position.
    pub fn add(&mut self, record: VoterRecord) -> Result<usize, VoterRegistryError> {
        validate_record(&record, self.today())?;
        let position = self.store.add(record);
        self.view.refresh(&self.store);
        self.persist_after_mutation();
        Ok(position)
    }

    /// Validates `record` and stores it in place of the record with `id`.
    pub fn update(&mut self, id: RecordId, record: VoterRecord) -> Result<(), VoterRegistryError> {
        validate_record(&record, self.today())?;
        self.store
            .update_by_id(id, record)
            .map_err(log_store_error)?;
        self.view.refresh(&self.store);
        self.persist_after_mutation();
        Ok(())
    }

    /// Like [`update`](Self::update), addressing the record by position.
    pub fn update_at(
        &mut self,
        position: usize,
        record: VoterRecord,
    ) -> Result<(), VoterRegistryError> {
        let id = self.id_at(position)?;
        self.update(id, record)
    }

    /// Removes the record with `id` and returns it.
    ///
    /// The current page steps back if it would otherwise be empty.
    pub fn delete(&mut self, id: RecordId) -> Result<VoterRecord, VoterRegistryError> {
        let removed = self.store.delete_by_id(id).map_err(log_store_error)?;
        self.view.after_delete(&self.store);
        self.persist_after_mutation();
        Ok(removed)
    }

    /// Like [`delete`](Self::delete), addressing the record by position.
    pub fn delete_at(&mut self, position: usize) -> Result<VoterRecord, VoterRegistryError> {
        let id = self.id_at(position)?;
        self.delete(id)
    }

    fn id_at(&self, position: usize) -> Result<RecordId, VoterRegistryError> {
        self.store.id_at(position).ok_or_else(|| {
            log_store_error(StoreError::OutOfRange {
                position,
                len: self.store.len(),
            })
            .into()
        })
    }

    /// Decodes CSV text and reports what importing it would do, without
    /// touching the store.
    pub fn preview_import(&self, text: &str) -> Result<ImportPreview, VoterRegistryError> {
        let outcome = CsvDecoder::new(self.header_policy).decode(text)?;
        Ok(self.preview_of(&outcome))
    }

    fn preview_of(&self, outcome: &DecodeOutcome) -> ImportPreview {
        ImportPreview {
            incoming: outcome.records.len(),
            skipped: outcome.skipped_count(),
            existing: self.store.len(),
        }
    }

    /// Decodes CSV text and, if `confirm` accepts the preview, replaces the
    /// whole store with the decoded records.
    ///
    /// Decoding failures leave the store untouched. After a successful
    /// import the view returns to page 1 with the search reapplied.
    pub fn import_text<F>(
        &mut self,
        text: &str,
        confirm: F,
    ) -> Result<ImportOutcome, VoterRegistryError>
    where
        F: FnOnce(&ImportPreview) -> bool,
    {
        let outcome = CsvDecoder::new(self.header_policy).decode(text)?;
        let preview = self.preview_of(&outcome);
        if !confirm(&preview) {
            info!("import cancelled");
            return Ok(ImportOutcome::Cancelled);
        }

        self.store.replace_all(outcome.records);
        self.view.reset(&self.store);
        self.persist_after_mutation();
        info!(
            count = preview.incoming,
            skipped = preview.skipped,
            "imported voter records"
        );
        Ok(ImportOutcome::Imported {
            count: preview.incoming,
            skipped: preview.skipped,
        })
    }

    /// Reads a CSV file and imports it with [`import_text`](Self::import_text).
    pub fn import_file<F>(
        &mut self,
        path: &Path,
        confirm: F,
    ) -> Result<ImportOutcome, VoterRegistryError>
    where
        F: FnOnce(&ImportPreview) -> bool,
    {
        let text = std::fs::read_to_string(path)?;
        self.import_text(&text, confirm)
    }

    /// Encodes the full store, ignoring the search, as CSV text.
    pub fn export_text(&self) -> Result<String, VoterRegistryError> {
        if self.store.is_empty() {
            return Err(VoterRegistryError::NothingToExport);
        }
        Ok(encode(self.store.records()))
    }

    /// Writes the full store as CSV to `path`.
    pub fn export(&self, path: &Path) -> Result<ExportStats, VoterRegistryError> {
        if self.store.is_empty() {
            return Err(VoterRegistryError::NothingToExport);
        }
        let mut exporter = CsvExporter::new();
        let stats = exporter.write(path, &self.store.snapshot())?;
        Ok(stats.clone())
    }

    /// Writes the record set through the gateway.
    ///
    /// Always attempts the write, even after an earlier automatic write
    /// failed. Success makes storage available again.
    pub fn save(&mut self) -> Result<(), VoterRegistryError> {
        self.gateway.save(&self.store.snapshot())?;
        if !self.storage_available {
            info!("storage available again");
        }
        self.storage_available = true;
        self.dirty = false;
        Ok(())
    }

    /// Saves pending changes before the program exits.
    ///
    /// Does nothing when the session is clean.
    pub fn flush_on_exit(&mut self) -> Result<(), VoterRegistryError> {
        if !self.dirty {
            return Ok(());
        }
        self.save().inspect_err(|e| {
            error!(error = %e, "unsaved changes could not be written on exit");
        })
    }

    fn persist_after_mutation(&mut self) {
        self.dirty = true;
        if !self.auto_persist || !self.storage_available {
            return;
        }
        match self.gateway.save(&self.store.snapshot()) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                warn!(
                    error = %e,
                    "storage unavailable, changes are kept in memory only"
                );
                self.storage_available = false;
            }
        }
    }

    /// Sets the search query and returns to page 1.
    pub fn set_search(&mut self, query: &str) {
        self.view.set_search(query, &self.store);
    }

    /// Changes the page size and returns to page 1.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), VoterRegistryError> {
        self.view.set_rows_per_page(rows_per_page)
    }

    pub fn next_page(&mut self) {
        self.view.next_page(&self.store);
    }

    pub fn prev_page(&mut self) {
        self.view.prev_page(&self.store);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.view.go_to_page(page, &self.store);
    }

    /// The current page of the view.
    pub fn page(&self) -> Page<'_> {
        self.view.page(&self.store)
    }

    /// Id of the record shown in `row` of the current page.
    pub fn id_for_row(&self, row: usize) -> Option<RecordId> {
        self.view.id_for_row(&self.store, row)
    }
}

fn log_store_error(e: StoreError) -> StoreError {
    error!(error = %e, "stale record handle");
    e
}
