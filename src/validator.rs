//! Validation Module
//!
//! Two kinds of checks live here:
//!
//! - [`validate_record`] checks a single [`VoterRecord`] before it is added
//!   or updated: every field except the address is required, the date of
//!   birth must be a `YYYY-MM-DD` date that is not in the future and the
//!   eligibility must read `Yes` or `No`.
//! - [`CsvValidator`] reads a CSV file the way an import would and reports,
//!   line by line, what an import would drop or accept with bad field
//!   values. It never touches a store.
//!
//! # Example
//!
//! ```rust,ignore
//! use voter_registry::validator::CsvValidator;
//! use std::path::Path;
//!
//! let validator = CsvValidator::default();
//! let stats = validator.validate(Path::new("voters.csv"))?;
//!
//! println!("Total records: {}", stats.total_records);
//! println!("Valid records: {}", stats.valid_records);
//! println!("Dropped lines: {}", stats.dropped_lines);
//! ```

use chrono::{Local, NaiveDate};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::csv_handler::{check_header, split_fields, split_lines, HeaderPolicy, MIN_FIELDS};
use crate::error::{ImportError, ValidationError, VoterRegistryError};
use crate::record::{parse_date_of_birth, Eligibility, VoterRecord, FIELD_COUNT, FIELD_LABELS};

/// Index of the address, the only optional field.
const ADDRESS_INDEX: usize = FIELD_COUNT - 1;

/// Checks that `record` can be saved.
///
/// Fields are checked in display order and the first failure is returned.
/// `today` is the reference date for rejecting future dates of birth.
pub fn validate_record(record: &VoterRecord, today: NaiveDate) -> Result<(), ValidationError> {
    for (index, value) in record.fields().iter().enumerate() {
        if index != ADDRESS_INDEX && value.trim().is_empty() {
            return Err(ValidationError::MissingField(FIELD_LABELS[index]));
        }
    }

    let dob = parse_date_of_birth(&record.date_of_birth)?;
    if dob > today {
        return Err(ValidationError::FutureDate(record.date_of_birth.clone()));
    }
    record.eligibility.parse::<Eligibility>()?;
    Ok(())
}

/// Result of validating a single CSV data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The line imports as a complete record.
    Valid,

    /// The line has too few fields and an import would drop it.
    TooFewFields {
        /// Minimum number of fields a record needs.
        minimum: usize,
        /// The number of fields found.
        actual: usize,
    },

    /// The line imports, but a field fails record validation.
    InvalidField(ValidationError),
}

impl ValidationResult {
    /// True when an import would skip this line.
    pub fn is_dropped(&self) -> bool {
        matches!(self, ValidationResult::TooFewFields { .. })
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "Valid"),
            ValidationResult::TooFewFields { minimum, actual } => {
                write!(
                    f,
                    "Too few fields: expected at least {}, found {} (dropped on import)",
                    minimum, actual
                )
            }
            ValidationResult::InvalidField(error) => write!(f, "Invalid field: {}", error),
        }
    }
}

/// A problem found on one line, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIssue {
    /// Line 1 is the header row.
    pub line_number: u64,
    pub result: ValidationResult,
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line_number, self.result)
    }
}

/// Statistics collected while validating a CSV file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationStats {
    /// Non-blank data lines (header excluded).
    pub total_records: u64,

    /// Lines that import as records with valid fields.
    pub valid_records: u64,

    /// Lines with any issue, dropped or not.
    pub invalid_records: u64,

    /// Lines an import would skip for having too few fields.
    pub dropped_lines: u64,

    /// Header problem under [`HeaderPolicy::Strict`]; an import would be
    /// refused outright.
    pub header_error: Option<ImportError>,

    /// One entry per line with an issue, in file order.
    pub errors: Vec<LineIssue>,
}

impl ValidationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the file would import completely with valid records.
    pub fn is_valid(&self) -> bool {
        self.header_error.is_none() && self.invalid_records == 0 && self.total_records > 0
    }

    /// True if an import of this file would produce at least one record.
    pub fn is_importable(&self) -> bool {
        self.header_error.is_none() && self.total_records > self.dropped_lines
    }

    pub fn record_valid(&mut self) {
        self.total_records += 1;
        self.valid_records += 1;
    }

    pub fn record_invalid(&mut self, line_number: u64, result: ValidationResult) {
        self.total_records += 1;
        self.invalid_records += 1;
        if result.is_dropped() {
            self.dropped_lines += 1;
        }
        self.errors.push(LineIssue {
            line_number,
            result,
        });
    }
}

impl fmt::Display for ValidationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CSV Validation Report")?;
        writeln!(f, "=====================")?;
        writeln!(
            f,
            "Status: {}",
            if self.is_valid() { "PASSED" } else { "FAILED" }
        )?;
        if let Some(header_error) = &self.header_error {
            writeln!(f, "Header: {}", header_error)?;
        }
        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "  Total records:     {:>10}", self.total_records)?;
        writeln!(f, "  Valid records:     {:>10}", self.valid_records)?;
        writeln!(f, "  Invalid records:   {:>10}", self.invalid_records)?;
        writeln!(f, "  Dropped lines:     {:>10}", self.dropped_lines)?;

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "Errors:")?;
            for error in &self.errors {
                writeln!(f, "  {}", error)?;
            }
        }

        Ok(())
    }
}

/// Validator for voter CSV files.
///
/// Lines are split exactly as the import decoder splits them, so the report
/// matches what an import of the same file would do. Unlike an import it
/// keeps going past a bad header and checks every line.
#[derive(Debug, Clone)]
pub struct CsvValidator {
    header_policy: HeaderPolicy,
    today: NaiveDate,
}

impl Default for CsvValidator {
    fn default() -> Self {
        Self::new(HeaderPolicy::default())
    }
}

impl CsvValidator {
    /// Creates a validator using today's local date for date-of-birth checks.
    pub fn new(header_policy: HeaderPolicy) -> Self {
        Self {
            header_policy,
            today: Local::now().date_naive(),
        }
    }

    /// Uses `today` as the reference date instead of the local date.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Validates the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VoterRegistryError::Io`] if the file cannot be read. Problems
    /// with the content are collected in the returned stats instead.
    pub fn validate(&self, path: &Path) -> Result<ValidationStats, VoterRegistryError> {
        let text = fs::read_to_string(path)?;
        Ok(self.validate_text(&text))
    }

    /// Validates CSV text.
    pub fn validate_text(&self, text: &str) -> ValidationStats {
        let mut stats = ValidationStats::new();
        let lines = split_lines(text);
        let mut lines = lines.into_iter().skip_while(|l| l.text.trim().is_empty());

        let Some(header) = lines.next() else {
            stats.header_error = Some(ImportError::EmptyOrInvalid);
            return stats;
        };
        if self.header_policy == HeaderPolicy::Strict {
            stats.header_error = check_header(&split_fields(header.text)).err();
        }

        for line in lines.filter(|l| !l.text.trim().is_empty()) {
            match self.validate_line(line.text) {
                ValidationResult::Valid => stats.record_valid(),
                result => stats.record_invalid(line.number, result),
            }
        }
        stats
    }

    fn validate_line(&self, line: &str) -> ValidationResult {
        let fields = split_fields(line);
        if fields.len() < MIN_FIELDS {
            return ValidationResult::TooFewFields {
                minimum: MIN_FIELDS,
                actual: fields.len(),
            };
        }
        let record = VoterRecord::from_fields(fields.into_iter().take(FIELD_COUNT));
        match validate_record(&record, self.today) {
            Ok(()) => ValidationResult::Valid,
            Err(error) => ValidationResult::InvalidField(error),
        }
    }
}
