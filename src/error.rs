//! Error module
//!
//! Defines custom error types using `thiserror` for the voter registry.
//! Each layer has its own error enum ([`ImportError`], [`StoreError`],
//! [`StorageError`], [`ValidationError`]) and [`VoterRegistryError`] wraps all
//! of them with `From` conversions so `?` works across layers.

use thiserror::Error;

/// Failure to turn CSV text into a record set.
///
/// Individual malformed lines are never reported here; they are dropped and
/// counted by the decoder. Only whole-input conditions are errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The input has no lines, only a header line, or no line yielded a
    /// record with the required number of fields.
    #[error("CSV input is empty or contains no valid voter records")]
    EmptyOrInvalid,

    /// Under the strict header policy, a header column does not name the
    /// expected field.
    #[error("CSV header column {column} is \"{found}\", expected \"{expected}\"")]
    HeaderMismatch {
        /// 1-based column number.
        column: usize,
        /// The expected header name.
        expected: &'static str,
        /// The header name found in the file.
        found: String,
    },
}

/// Invalid handle passed to a [`RecordStore`](crate::store::RecordStore)
/// operation.
///
/// Positions and ids are derived from the current render, so these indicate a
/// stale handle held across a mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Position is not within `0..len`.
    #[error("position {position} is out of range for a store of {len} records")]
    OutOfRange {
        /// The offending position.
        position: usize,
        /// Number of records in the store at the time of the call.
        len: usize,
    },

    /// No record carries this id.
    #[error("no record with id {0}")]
    UnknownId(crate::store::RecordId),
}

/// Failure of the durable storage slot behind a
/// [`PersistenceGateway`](crate::persistence::PersistenceGateway).
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the slot failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The slot holds data that is not a JSON record list.
    #[error("stored data is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// A required record field is missing or malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The date of birth is not a `YYYY-MM-DD` calendar date.
    #[error("date of birth \"{0}\" is not a valid YYYY-MM-DD date")]
    InvalidDate(String),

    /// The date of birth lies after the reference date.
    #[error("date of birth \"{0}\" is in the future")]
    FutureDate(String),

    /// Eligibility is neither `Yes` nor `No`.
    #[error("eligibility \"{0}\" must be Yes or No")]
    InvalidEligibility(String),
}

/// The main error type for the voter registry.
///
/// # Error Categories
///
/// - **User-facing**: validation and import failures; no state was changed
/// - **Storage**: the persistence gateway failed during an explicit save
/// - **Programming errors**: stale positions or ids
/// - **I/O and configuration**: reading CSV/config files, bad arguments
#[derive(Error, Debug)]
pub enum VoterRegistryError {
    /// A record failed field validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A CSV file failed the `validate` report.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// A CSV import produced no usable records.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// A store handle was stale.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The persistence gateway could not save the record set.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// Export was requested with no records in the store.
    #[error("No data to export")]
    NothingToExport,

    /// General I/O error (CSV files, config files, terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration file).
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line argument or configuration value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}
