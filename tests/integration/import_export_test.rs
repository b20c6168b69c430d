//! Integration tests for CSV import, export and file validation

use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

use voter_registry::csv_handler::{header_row, HeaderPolicy};
use voter_registry::error::{ImportError, VoterRegistryError};
use voter_registry::persistence::MemoryGateway;
use voter_registry::record::VoterRecord;
use voter_registry::session::{ImportOutcome, Session, SessionOptions};
use voter_registry::validator::{CsvValidator, ValidationResult};

fn voter(name: &str, address: &str) -> VoterRecord {
    VoterRecord {
        name: name.to_string(),
        date_of_birth: "1990-01-01".to_string(),
        age: "34".to_string(),
        eligibility: "Yes".to_string(),
        voter_id: format!("VX-{}", name.len()),
        phone: "555-0100".to_string(),
        district: "North".to_string(),
        city: "Springfield".to_string(),
        area: "Elm".to_string(),
        street: "Main St".to_string(),
        pincode: "12345".to_string(),
        address: address.to_string(),
    }
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn session() -> Session<MemoryGateway> {
    let mut session = Session::open(MemoryGateway::new(), SessionOptions::default()).unwrap();
    session.set_reference_date(reference_date());
    session
}

#[test]
fn test_export_then_import_reproduces_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("voter_data_2024-06-01.csv");

    let mut source = session();
    source.add(voter("Doe, Jane", "Flat 2, \"Rose\" Lane")).unwrap();
    source.add(voter("Bob", "")).unwrap();
    source.add(voter("Carol", "Line one\nLine two")).unwrap();
    let stats = source.export(&path).unwrap();
    assert_eq!(stats.total_records, 3);

    let mut target = session();
    target.add(voter("Old", "")).unwrap();
    let outcome = target.import_file(&path, |_| true).unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Imported {
            count: 3,
            skipped: 0
        }
    );

    let imported: Vec<VoterRecord> = target.store().snapshot();
    assert_eq!(imported, source.store().snapshot());
    assert_eq!(target.gateway().stored().map(|r| r.len()), Some(3));
}

#[test]
fn test_export_empty_store_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let result = session().export(&path);
    assert!(matches!(result, Err(VoterRegistryError::NothingToExport)));
    assert!(!path.exists());
}

#[test]
fn test_header_only_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("header_only.csv");
    fs::write(&path, format!("{}\n", header_row())).unwrap();

    let mut session = session();
    session.add(voter("Alice", "")).unwrap();
    let result = session.import_file(&path, |_| true);

    assert!(matches!(
        result,
        Err(VoterRegistryError::Import(ImportError::EmptyOrInvalid))
    ));
    assert_eq!(session.len(), 1);
}

#[test]
fn test_short_row_dropped_on_import() {
    let text = format!(
        "{}\nAlice,1990-01-01,34,Yes,V1,555,North,Springfield,Elm,Main St,12345\nBob,1990,34,Yes,V2,555,North,Springfield,Elm\n",
        header_row()
    );

    let mut session = session();
    let mut seen = None;
    let outcome = session
        .import_text(&text, |preview| {
            seen = Some(*preview);
            true
        })
        .unwrap();

    assert_eq!(
        outcome,
        ImportOutcome::Imported {
            count: 1,
            skipped: 1
        }
    );
    let preview = seen.unwrap();
    assert_eq!(preview.incoming, 1);
    assert_eq!(preview.skipped, 1);
    assert_eq!(session.store().records().next().unwrap().address, "");
}

#[test]
fn test_declined_import_keeps_store() {
    let text = format!(
        "{}\nAlice,1990-01-01,34,Yes,V1,555,North,Springfield,Elm,Main St,12345,Somewhere\n",
        header_row()
    );

    let mut session = session();
    session.add(voter("Bob", "")).unwrap();
    let outcome = session.import_text(&text, |_| false).unwrap();

    assert_eq!(outcome, ImportOutcome::Cancelled);
    assert_eq!(session.store().records().next().unwrap().name, "Bob");
}

#[test]
fn test_strict_header_mismatch_and_positional_fallback() {
    let text = "a,b,c,d,e,f,g,h,i,j,k,l\nAlice,1990-01-01,34,Yes,V1,555,North,Springfield,Elm,Main St,12345,\n";

    let mut session = session();
    assert!(matches!(
        session.import_text(text, |_| true),
        Err(VoterRegistryError::Import(ImportError::HeaderMismatch { column: 1, .. }))
    ));

    session.set_header_policy(HeaderPolicy::Positional);
    let outcome = session.import_text(text, |_| true).unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Imported {
            count: 1,
            skipped: 0
        }
    );
}

#[test]
fn test_validator_reports_file_problems() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("check.csv");
    fs::write(
        &path,
        format!(
            "{}\n\
             Alice,1990-01-01,34,Yes,V1,555,North,Springfield,Elm,Main St,12345,\n\
             Bob,1990-01-01,34,Maybe,V2,555,North,Springfield,Elm,Main St,12345,\n\
             Carol,1990-01-01,34\n",
            header_row()
        ),
    )
    .unwrap();

    let stats = CsvValidator::new(HeaderPolicy::Strict)
        .with_reference_date(reference_date())
        .validate(&path)
        .unwrap();

    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.valid_records, 1);
    assert_eq!(stats.invalid_records, 2);
    assert_eq!(stats.dropped_lines, 1);
    assert!(!stats.is_valid());
    assert!(stats.is_importable());
    assert!(matches!(
        stats.errors[0].result,
        ValidationResult::InvalidField(_)
    ));
    assert_eq!(stats.errors[1].line_number, 4);
    assert!(stats.errors[1].result.is_dropped());
}

#[test]
fn test_validator_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = CsvValidator::default().validate(&dir.path().join("missing.csv"));
    assert!(matches!(result, Err(VoterRegistryError::Io(_))));
}
