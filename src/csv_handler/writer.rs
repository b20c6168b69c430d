use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::info;

use super::encoding::{escape_field, needs_quoting};
use super::record::{header_row, ExportStats};
use crate::error::VoterRegistryError;
use crate::record::VoterRecord;

/// Prefix of exported file names.
pub const EXPORT_FILE_PREFIX: &str = "voter_data_";

/// Encodes records as CSV text.
///
/// The output is the header row followed by one row per record, each field
/// passed through [`escape_field`], rows joined by `\n` with no trailing
/// newline. An empty record list encodes to the header alone.
pub fn encode<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a VoterRecord>,
{
    let mut out = header_row();
    for record in records {
        out.push('\n');
        push_row(&mut out, record);
    }
    out
}

fn push_row(out: &mut String, record: &VoterRecord) {
    for (i, field) in record.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
}

/// File name for an export made on `date`: `voter_data_<YYYY-MM-DD>.csv`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("{}{}.csv", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Writes encoded record sets to files.
///
/// The whole text is built in memory with [`encode`] and written in one call.
#[derive(Debug, Default)]
pub struct CsvExporter {
    stats: ExportStats,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `records` and writes them to `path`, replacing any existing
    /// file.
    pub fn write(
        &mut self,
        path: &Path,
        records: &[VoterRecord],
    ) -> Result<&ExportStats, VoterRegistryError> {
        let text = encode(records);
        fs::write(path, &text)?;

        self.stats = ExportStats {
            total_records: records.len() as u64,
            quoted_fields: records
                .iter()
                .flat_map(|r| r.fields())
                .filter(|f| needs_quoting(f))
                .count() as u64,
            bytes_written: text.len(),
        };
        info!(
            path = %path.display(),
            records = self.stats.total_records,
            "exported voter records"
        );
        Ok(&self.stats)
    }

    /// Statistics of the last export.
    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }
}
