//! Property-based tests for CSV handling
//!
//! Field escaping, line splitting and the encode/decode boundary.

use proptest::prelude::*;

use voter_registry::csv_handler::{
    decode, encode, escape_field, split_fields, split_lines, CsvDecoder, HeaderPolicy, MIN_FIELDS,
};
use voter_registry::record::{VoterRecord, FIELD_COUNT};

/// Strategy for field text including CSV special characters
fn field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain text
        "[a-zA-Z0-9 ]{0,20}".prop_map(|s| s),
        // Commas
        "[a-zA-Z0-9]{0,8},[a-zA-Z0-9 ]{0,8}".prop_map(|s| s),
        // Double quotes
        "[a-zA-Z0-9]{0,5}\"[a-zA-Z0-9]{0,5}\"[a-zA-Z0-9]{0,5}".prop_map(|s| s),
        // Newlines
        "[a-zA-Z0-9]{0,8}\n[a-zA-Z0-9]{0,8}".prop_map(|s| s),
        // Mixed
        "[a-z]{0,4},\"[a-z]{0,4}\"\n[a-z]{0,4}".prop_map(|s| s),
        Just(String::new()),
        Just("Flat 2, 12 \"Rose\" Lane".to_string()),
        Just("Zoë Ångström".to_string()),
    ]
}

/// Strategy for a record whose first field is never blank, so a line never
/// encodes to whitespace only
fn record_strategy() -> impl Strategy<Value = VoterRecord> {
    (
        "[A-Za-z][A-Za-z ,]{0,15}",
        prop::collection::vec(field_strategy(), FIELD_COUNT - 1),
    )
        .prop_map(|(name, rest)| {
            VoterRecord::from_fields(std::iter::once(name).chain(rest))
        })
}

fn records_strategy() -> impl Strategy<Value = Vec<VoterRecord>> {
    prop::collection::vec(record_strategy(), 1..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Encoding then decoding reproduces the records in order.
    #[test]
    fn prop_encode_decode_preserves_records(records in records_strategy()) {
        let outcome = decode(&encode(&records)).unwrap();
        prop_assert_eq!(outcome.records, records);
        prop_assert_eq!(outcome.skipped.len(), 0);
    }

    /// A field escaped on its own splits back to itself.
    #[test]
    fn prop_escaped_field_splits_back(field in field_strategy()) {
        let escaped = escape_field(&field);
        let fields = split_fields(&escaped);
        prop_assert_eq!(fields, vec![field]);
    }

    /// Fields without special characters are left untouched.
    #[test]
    fn prop_plain_field_not_quoted(field in "[a-zA-Z0-9 .-]{0,30}") {
        let escaped = escape_field(&field);
        prop_assert_eq!(escaped.as_ref(), field.as_str());
    }

    /// Joined escaped fields split into the same fields.
    #[test]
    fn prop_row_splits_into_fields(fields in prop::collection::vec(field_strategy(), 1..15)) {
        let line: Vec<String> = fields.iter().map(|f| escape_field(f).into_owned()).collect();
        prop_assert_eq!(split_fields(&line.join(",")), fields);
    }

    /// Each encoded record occupies exactly one logical line.
    #[test]
    fn prop_one_logical_line_per_record(records in records_strategy()) {
        let text = encode(&records);
        prop_assert_eq!(split_lines(&text).len(), records.len() + 1);
    }

    /// Lines with too few fields are dropped and counted, never imported.
    #[test]
    fn prop_short_lines_skipped(
        records in records_strategy(),
        short in prop::collection::vec("[a-z]{1,5}", 1..MIN_FIELDS),
    ) {
        let text = format!("{}\n{}", encode(&records), short.join(","));
        let outcome = decode(&text).unwrap();
        prop_assert_eq!(outcome.records.len(), records.len());
        prop_assert_eq!(outcome.skipped.len(), 1);
        prop_assert_eq!(outcome.skipped[0].field_count, short.len());
    }

    /// A line with an unbalanced quote is dropped on its own; every other
    /// record survives.
    #[test]
    fn prop_stray_quote_costs_one_line(
        records in records_strategy(),
        at_seed in any::<usize>(),
        stray in "[a-z]{1,6} \"[a-z]{1,6}(,[a-z]{0,4}){11}",
    ) {
        let text = encode(&records);
        let mut lines: Vec<&str> = split_lines(&text).iter().map(|l| l.text).collect();
        let at = 1 + at_seed % records.len();
        lines.insert(at, stray.as_str());

        let outcome = decode(&lines.join("\n")).unwrap();
        prop_assert_eq!(outcome.records, records);
        prop_assert_eq!(outcome.skipped.len(), 1);
        prop_assert_eq!(outcome.skipped[0].field_count, 1);
    }

    /// The positional policy decodes whatever the strict policy accepts.
    #[test]
    fn prop_positional_accepts_encoded_output(records in records_strategy()) {
        let text = encode(&records);
        let outcome = CsvDecoder::new(HeaderPolicy::Positional).decode(&text).unwrap();
        prop_assert_eq!(outcome.records, records);
    }
}

#[test]
fn test_split_quoted_comma() {
    assert_eq!(
        split_fields("John,\"Doe, Jr.\",30"),
        vec!["John", "Doe, Jr.", "30"]
    );
}

#[test]
fn test_escape_examples() {
    assert_eq!(escape_field("Doe, Jane"), "\"Doe, Jane\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_field("Main St"), "Main St");
}
