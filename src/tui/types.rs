//! TUI types and utility functions

use std::io::IsTerminal;

use crate::record::{VoterRecord, FIELD_COUNT, FIELD_LABELS};
use crate::session::ImportPreview;
use crate::store::RecordId;

/// Page sizes offered by the rows-per-page selector.
pub const ROWS_PER_PAGE_CHOICES: [usize; 5] = [5, 10, 25, 50, 100];

/// Next page size after `current` in [`ROWS_PER_PAGE_CHOICES`], wrapping.
pub fn next_rows_per_page(current: usize) -> usize {
    ROWS_PER_PAGE_CHOICES
        .iter()
        .copied()
        .find(|&n| n > current)
        .unwrap_or(ROWS_PER_PAGE_CHOICES[0])
}

/// Previous page size before `current` in [`ROWS_PER_PAGE_CHOICES`], wrapping.
pub fn prev_rows_per_page(current: usize) -> usize {
    ROWS_PER_PAGE_CHOICES
        .iter()
        .rev()
        .copied()
        .find(|&n| n < current)
        .unwrap_or(ROWS_PER_PAGE_CHOICES[ROWS_PER_PAGE_CHOICES.len() - 1])
}

/// What keystrokes currently drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Table navigation.
    Normal,
    /// Typing into the search bar; the filter applies as you type.
    Search,
    /// Typing the path of a CSV file to import.
    ImportPath,
    /// Waiting for y/n before replacing all records.
    ConfirmImport,
    /// Waiting for y/n before deleting a record.
    ConfirmDelete { id: RecordId, name: String },
    /// Editing the add/edit form.
    Form,
}

/// Kind of a status line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Message shown on the status line until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// CSV text read from disk, waiting for the replace confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImport {
    pub path: String,
    pub text: String,
    pub preview: ImportPreview,
}

/// The add/edit form: one text buffer per record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordForm {
    /// Record being edited; `None` when adding.
    pub target: Option<RecordId>,
    pub values: [String; FIELD_COUNT],
    /// Index of the focused field.
    pub focus: usize,
}

impl RecordForm {
    pub fn new() -> Self {
        Self {
            target: None,
            values: Default::default(),
            focus: 0,
        }
    }

    /// A form prefilled with `record`.
    pub fn edit(id: RecordId, record: &VoterRecord) -> Self {
        Self {
            target: Some(id),
            values: record.fields().map(str::to_string),
            focus: 0,
        }
    }

    pub fn label(&self, index: usize) -> &'static str {
        FIELD_LABELS[index]
    }

    pub fn focused_mut(&mut self) -> &mut String {
        &mut self.values[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FIELD_COUNT;
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// True when age and eligibility are blank and should be derived from
    /// the date of birth.
    pub fn wants_derived_age(&self) -> bool {
        self.values[2].trim().is_empty() && self.values[3].trim().is_empty()
    }

    pub fn to_record(&self) -> VoterRecord {
        VoterRecord::from_fields(self.values.iter().cloned())
    }
}

impl Default for RecordForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if the interactive browser can run.
pub fn should_enable_interactive() -> bool {
    if std::env::var("CI").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}
