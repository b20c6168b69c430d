//! Property-based tests for CLI argument validation

use clap::Parser;
use proptest::prelude::*;
use std::path::PathBuf;

use voter_registry::cli::{Args, Command};
use voter_registry::config::Config;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any positive rows-per-page value validates and lands in the config.
    #[test]
    fn prop_rows_per_page_applies(rows in 1usize..10_000) {
        let rows_arg = rows.to_string();
        let args = Args::try_parse_from(["voter-registry", "--rows-per-page", rows_arg.as_str(), "list"]).unwrap();
        prop_assert!(args.validate().is_ok());
        let mut config = Config::default();
        args.apply_to(&mut config);
        prop_assert_eq!(config.rows_per_page, rows);
        prop_assert!(config.validate().is_ok());
    }

    /// Positions are 1-based for both update and delete.
    #[test]
    fn prop_positions_validate(position in 0usize..1000) {
        let position_arg = position.to_string();
        let delete = Args::try_parse_from(["voter-registry", "delete", position_arg.as_str(), "--yes"]).unwrap();
        prop_assert_eq!(delete.validate().is_ok(), position > 0);

        let update = Args::try_parse_from([
            "voter-registry", "update", position_arg.as_str(), "--phone", "555",
        ]).unwrap();
        prop_assert_eq!(update.validate().is_ok(), position > 0);
    }

    /// The data file flag overrides the configured path wherever it appears.
    #[test]
    fn prop_data_file_overrides(name in "[a-z]{1,10}\\.json", before in any::<bool>()) {
        let argv: Vec<&str> = if before {
            vec!["voter-registry", "--data-file", name.as_str(), "export"]
        } else {
            vec!["voter-registry", "export", "--data-file", name.as_str()]
        };
        let args = Args::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);
        prop_assert_eq!(config.data_file, PathBuf::from(&name));
    }

    /// Search text passes through untouched.
    #[test]
    fn prop_search_text_preserved(query in "[a-zA-Z0-9 ,]{1,20}") {
        let args = Args::try_parse_from(["voter-registry", "list", "--search", query.as_str()]).unwrap();
        match args.command() {
            Command::List { search, page } => {
                prop_assert_eq!(search, Some(query));
                prop_assert_eq!(page, 1);
            }
            other => prop_assert!(false, "unexpected command {:?}", other),
        }
    }
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Args::try_parse_from(["voter-registry", "print"]).is_err());
}

#[test]
fn test_import_requires_file() {
    assert!(Args::try_parse_from(["voter-registry", "import"]).is_err());
}
