//! CSV layout constants and decode/export result types.
//!
//! Defines the fixed header, the minimum field count an imported line must
//! reach, [`DecodeOutcome`] for imports and [`ExportStats`] for exports.

use crate::record::{VoterRecord, FIELD_COUNT, FIELD_LABELS};

/// Header row columns, in record field order.
pub const CSV_HEADERS: [&str; FIELD_COUNT] = FIELD_LABELS;

/// A data line must split into at least this many fields to become a record.
///
/// The twelfth field, the address, is optional.
pub const MIN_FIELDS: usize = 11;

/// Header names accepted for a column besides the canonical one, as
/// `(column index, alias)`. Files written by older exports label the date of
/// birth column in full.
pub const HEADER_ALIASES: [(usize, &str); 1] = [(1, "Date of Birth")];

/// Returns the header row as written by the encoder.
pub fn header_row() -> String {
    CSV_HEADERS.join(",")
}

/// A data line that was dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the input (the header is line 1).
    pub line_number: u64,
    /// Number of fields the line split into.
    pub field_count: usize,
}

/// Result of decoding CSV text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Records in input order.
    pub records: Vec<VoterRecord>,
    /// Non-blank data lines that had fewer than [`MIN_FIELDS`] fields.
    pub skipped: Vec<SkippedLine>,
}

impl DecodeOutcome {
    /// Number of lines dropped for having too few fields.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Statistics for an export.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportStats {
    /// Number of data rows written (header excluded).
    pub total_records: u64,
    /// Number of fields that needed quoting.
    pub quoted_fields: u64,
    /// Size of the written text in bytes.
    pub bytes_written: usize,
}
