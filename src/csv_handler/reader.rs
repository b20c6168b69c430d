use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encoding::{split_fields, split_lines};
use super::record::{DecodeOutcome, SkippedLine, CSV_HEADERS, HEADER_ALIASES, MIN_FIELDS};
use crate::error::ImportError;
use crate::record::{VoterRecord, FIELD_COUNT};

/// How the header line of an imported file is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// The header must name the expected columns in order. Names are compared
    /// trimmed and case-insensitively; the address column may be absent.
    #[default]
    Strict,
    /// The header line is skipped without inspection and data is taken by
    /// position.
    Positional,
}

/// Decoder turning CSV text into [`VoterRecord`]s.
///
/// The first line is the header; every following non-blank line is split
/// with [`split_fields`]. Lines with at least [`MIN_FIELDS`] fields become
/// records, shorter ones are dropped and reported in
/// [`DecodeOutcome::skipped`]. Fields beyond the twelfth are ignored.
///
/// # Errors
///
/// Decoding fails only for whole-input conditions:
/// - [`ImportError::EmptyOrInvalid`] when the text has no lines, only a
///   header, or not a single valid record
/// - [`ImportError::HeaderMismatch`] under [`HeaderPolicy::Strict`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder {
    header_policy: HeaderPolicy,
}

impl CsvDecoder {
    /// Creates a decoder with the given header policy.
    pub fn new(header_policy: HeaderPolicy) -> Self {
        Self { header_policy }
    }

    /// Returns the header policy in effect.
    pub fn header_policy(&self) -> HeaderPolicy {
        self.header_policy
    }

    /// Decodes `text` into records.
    pub fn decode(&self, text: &str) -> Result<DecodeOutcome, ImportError> {
        let lines = split_lines(text);
        let mut lines = lines.into_iter().skip_while(|l| l.text.trim().is_empty());

        let header = lines.next().ok_or(ImportError::EmptyOrInvalid)?;
        let data: Vec<_> = lines.filter(|l| !l.text.trim().is_empty()).collect();
        if data.is_empty() {
            return Err(ImportError::EmptyOrInvalid);
        }

        if self.header_policy == HeaderPolicy::Strict {
            check_header(&split_fields(header.text))?;
        }

        let mut outcome = DecodeOutcome::default();
        for line in data {
            let fields = split_fields(line.text);
            if fields.len() < MIN_FIELDS {
                debug!(
                    line = line.number,
                    fields = fields.len(),
                    "dropping CSV line with too few fields"
                );
                outcome.skipped.push(SkippedLine {
                    line_number: line.number,
                    field_count: fields.len(),
                });
                continue;
            }
            outcome
                .records
                .push(VoterRecord::from_fields(fields.into_iter().take(FIELD_COUNT)));
        }

        if outcome.records.is_empty() {
            return Err(ImportError::EmptyOrInvalid);
        }
        Ok(outcome)
    }
}

/// Decodes `text` with the default [`HeaderPolicy::Strict`] decoder.
pub fn decode(text: &str) -> Result<DecodeOutcome, ImportError> {
    CsvDecoder::default().decode(text)
}

/// Verifies header names column by column.
///
/// The first [`MIN_FIELDS`] columns are required; the address column is
/// checked only when present and anything after it is ignored.
pub fn check_header(columns: &[String]) -> Result<(), ImportError> {
    for (index, &expected) in CSV_HEADERS.iter().enumerate() {
        let found = match columns.get(index).map(String::as_str) {
            Some(found) => found,
            None if index >= MIN_FIELDS => break,
            None => "",
        };
        if !header_matches(index, expected, found) {
            return Err(ImportError::HeaderMismatch {
                column: index + 1,
                expected,
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

fn header_matches(index: usize, expected: &str, found: &str) -> bool {
    let found = found.trim();
    found.eq_ignore_ascii_case(expected)
        || HEADER_ALIASES
            .iter()
            .any(|(i, alias)| *i == index && found.eq_ignore_ascii_case(alias))
}
