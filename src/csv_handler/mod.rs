//! CSV handler module
//!
//! Encodes voter records to CSV text and decodes CSV text back into records.
//!
//! # CSV File Format
//!
//! ```csv
//! Name,DOB,Age,Eligibility,Voter ID,Phone,District,City,Area,Street,Pincode,Address
//! Alice,2000-01-01,24,Yes,VX100,555-0100,North,Springfield,Elm,Main St,12345,"1 Main St, Apt 2"
//! ```
//!
//! Fields are positional. A field is quoted only when it contains a comma, a
//! double quote or a newline, with inner quotes doubled. On import, lines
//! with fewer than [`MIN_FIELDS`] fields are dropped and counted rather than
//! failing the whole file.
//!
//! # Example
//!
//! ```
//! use voter_registry::csv_handler::{decode, encode};
//! use voter_registry::record::VoterRecord;
//!
//! let record = VoterRecord {
//!     name: "Doe, Jane".to_string(),
//!     ..Default::default()
//! };
//! let text = encode([&record]);
//! let outcome = decode(&text).unwrap();
//! assert_eq!(outcome.records, vec![record]);
//! ```

pub mod encoding;
pub mod reader;
pub mod record;
pub mod writer;

pub use encoding::{escape_field, split_fields, split_lines};
pub use reader::{check_header, decode, CsvDecoder, HeaderPolicy};
pub use record::{
    header_row, DecodeOutcome, ExportStats, SkippedLine, CSV_HEADERS, MIN_FIELDS,
};
pub use writer::{encode, export_filename, CsvExporter};
