//! Integration tests for sessions backed by the JSON file gateway

use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

use voter_registry::error::VoterRegistryError;
use voter_registry::persistence::{JsonFileGateway, MemoryGateway, PersistenceGateway};
use voter_registry::record::VoterRecord;
use voter_registry::session::{Session, SessionOptions};

fn voter(name: &str, district: &str) -> VoterRecord {
    VoterRecord {
        name: name.to_string(),
        date_of_birth: "1985-03-15".to_string(),
        age: "39".to_string(),
        eligibility: "Yes".to_string(),
        voter_id: format!("VX-{}", name),
        phone: "555-0100".to_string(),
        district: district.to_string(),
        city: "Springfield".to_string(),
        area: "Elm".to_string(),
        street: "Main St".to_string(),
        pincode: "12345".to_string(),
        address: String::new(),
    }
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn open<G: PersistenceGateway>(gateway: G, options: SessionOptions) -> Session<G> {
    let mut session = Session::open(gateway, options).unwrap();
    session.set_reference_date(reference_date());
    session
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("voter_data.json");

    {
        let mut session = open(JsonFileGateway::new(&path), SessionOptions::default());
        session.add(voter("Alice", "North")).unwrap();
        session.add(voter("Doe, Jane", "South")).unwrap();
        session.delete_at(0).unwrap();
    }

    let session = open(JsonFileGateway::new(&path), SessionOptions::default());
    let names: Vec<&str> = session.store().records().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Doe, Jane"]);
}

#[test]
fn test_corrupt_storage_opens_empty_and_is_kept_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("voter_data.json");
    fs::write(&path, "not json at all").unwrap();

    let mut session = open(JsonFileGateway::new(&path), SessionOptions::default());
    assert!(session.is_empty());

    session.add(voter("Alice", "North")).unwrap();
    let stored = JsonFileGateway::new(&path).load().unwrap().unwrap();
    assert_eq!(stored.len(), 1);

    let backups: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| {
            p.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("voter_data.json.unreadable-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "not json at all");
}

#[test]
fn test_snapshot_with_null_fields_survives_mutation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("voter_data.json");
    fs::write(
        &path,
        r#"[{"name":"Alice","dob":"1990-01-01","age":"34","eligibility":"Yes","address":null},
            {"name":"Bob","dob":null,"pincode":12345}]"#,
    )
    .unwrap();

    let mut session = open(JsonFileGateway::new(&path), SessionOptions::default());
    assert_eq!(session.len(), 2);
    session.add(voter("Zed", "North")).unwrap();

    let stored = JsonFileGateway::new(&path).load().unwrap().unwrap();
    let names: Vec<&str> = stored.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Zed"]);
    assert_eq!(stored[0].address, "");
    assert_eq!(stored[1].pincode, "12345");
}

#[test]
fn test_manual_persistence_writes_only_on_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("voter_data.json");
    let options = SessionOptions {
        auto_persist: false,
        ..SessionOptions::default()
    };

    let mut session = open(JsonFileGateway::new(&path), options);
    session.add(voter("Alice", "North")).unwrap();
    assert!(!path.exists());

    session.flush_on_exit().unwrap();
    assert!(path.exists());
    assert!(!session.is_dirty());
}

#[test]
fn test_pagination_and_search_through_session() {
    let mut session = open(MemoryGateway::new(), SessionOptions::default());
    for i in 0..22 {
        session
            .add(voter(&format!("Voter {:02}", i), "Riverside"))
            .unwrap();
    }
    session.add(voter("Jones", "Smithtown")).unwrap();

    assert_eq!(session.page().total_pages, 3);
    session.go_to_page(3);
    let positions: Vec<usize> = session.page().rows.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![20, 21, 22]);

    session.set_search("smith");
    let page = session.page();
    assert_eq!(page.current_page, 1);
    assert_eq!(page.visible_count, 1);
    assert_eq!(page.rows[0].record.name, "Jones");
    assert_eq!(page.rows[0].position, 22);
}

#[test]
fn test_deleting_last_row_on_page_moves_back() {
    let mut session = open(MemoryGateway::new(), SessionOptions::default());
    for i in 0..11 {
        session.add(voter(&format!("v{}", i), "North")).unwrap();
    }
    session.go_to_page(2);
    let id = session.id_for_row(0).unwrap();
    session.delete(id).unwrap();

    assert_eq!(session.view().current_page(), 1);
    assert_eq!(session.page().rows.len(), 10);
}

#[test]
fn test_edit_from_filtered_view_changes_right_record() {
    let mut session = open(MemoryGateway::new(), SessionOptions::default());
    session.add(voter("Alice", "North")).unwrap();
    session.add(voter("Bob", "South")).unwrap();
    session.add(voter("Carol", "South")).unwrap();

    session.set_search("south");
    let id = session.id_for_row(1).unwrap();
    let mut changed = session.store().get(id).unwrap().clone();
    changed.phone = "555-9999".to_string();
    session.update(id, changed).unwrap();

    let carol = session.store().records().nth(2).unwrap();
    assert_eq!(carol.name, "Carol");
    assert_eq!(carol.phone, "555-9999");
}

#[test]
fn test_invalid_record_rejected_with_validation_error() {
    let mut session = open(MemoryGateway::new(), SessionOptions::default());
    let mut record = voter("Alice", "North");
    record.date_of_birth = "2025-01-01".to_string();
    assert!(matches!(
        session.add(record),
        Err(VoterRegistryError::Validation(_))
    ));
    assert!(session.is_empty());
}

#[test]
fn test_unwritable_storage_degrades_once() {
    let dir = tempdir().unwrap();
    // A directory where the data file should be makes every write fail.
    let path = dir.path().join("voter_data.json");
    fs::create_dir(&path).unwrap();

    let mut session = open(JsonFileGateway::new(&path), SessionOptions::default());
    session.add(voter("Alice", "North")).unwrap();
    session.add(voter("Bob", "North")).unwrap();

    assert!(!session.storage_available());
    assert_eq!(session.len(), 2);
    assert!(matches!(
        session.save(),
        Err(VoterRegistryError::StorageUnavailable(_))
    ));
}
