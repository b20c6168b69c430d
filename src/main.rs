//! Voter Registry - manage voter registration records
//!
//! Records live in a JSON file (`voter_data.json` by default) and can be
//! added, changed, deleted, listed page by page with a search filter,
//! imported from and exported to CSV, or browsed interactively.
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Configuration/argument error |
//! | 2 | Validation or import error |
//! | 3 | File I/O or storage error |
//! | 4 | Other runtime error |

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use voter_registry::cli::{Args, Command, RecordFields};
use voter_registry::config::Config;
use voter_registry::csv_handler::{export_filename, HeaderPolicy};
use voter_registry::error::{StoreError, ValidationError, VoterRegistryError};
use voter_registry::logging::{init_logging, LogFormat, LogTarget};
use voter_registry::persistence::{JsonFileGateway, MemoryGateway, PersistenceGateway};
use voter_registry::record::{derive_age, parse_date_of_birth, Eligibility, VoterRecord};
use voter_registry::session::{ImportOutcome, ImportPreview, Session};
use voter_registry::tui::{run_tui, should_enable_interactive};
use voter_registry::validator::CsvValidator;
use voter_registry::view::Page;

/// Exit code for success
const EXIT_SUCCESS: u8 = 0;
/// Exit code for configuration/argument errors
const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for record validation and CSV import errors
const EXIT_VALIDATION_FAILURE: u8 = 2;
/// Exit code for file I/O and storage errors
const EXIT_IO_ERROR: u8 = 3;
/// Exit code for other runtime errors
const EXIT_RUNTIME_ERROR: u8 = 4;

type Gateway = Box<dyn PersistenceGateway>;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: Configuration error: {}", e);
        eprintln!("  Hint: Use --help for usage information");
        return ExitCode::from(EXIT_CONFIG_ERROR);
    }

    match run(args) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(error_to_exit_code(&e))
        }
    }
}

/// Main application logic: configuration, logging, then the subcommand.
fn run(args: Args) -> Result<(), VoterRegistryError> {
    let config = load_config(&args)?;
    let command = args.command();

    let target = match (&config.log_file, &command) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, Command::Browse) => LogTarget::Discard,
        (None, _) => LogTarget::Stderr,
    };
    init_logging(
        LogFormat::from_json_flag(config.json_logs),
        &config.log_level,
        &target,
    )?;

    match command {
        Command::Validate { file, positional } => return run_validate(&file, positional),
        Command::Age { dob, on } => return run_age(&dob, on.as_deref()),
        _ => {}
    }

    let gateway: Gateway = if args.no_storage {
        Box::new(MemoryGateway::new())
    } else {
        Box::new(JsonFileGateway::new(&config.data_file))
    };
    let mut session = Session::open(gateway, config.session_options())?;

    let result = dispatch(&mut session, command);
    let flushed = session.flush_on_exit();
    result.and(flushed)
}

/// Defaults, then the `--config` file, then command-line flags.
fn load_config(args: &Args) -> Result<Config, VoterRegistryError> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn dispatch(session: &mut Session<Gateway>, command: Command) -> Result<(), VoterRegistryError> {
    match command {
        Command::Add(fields) => run_add(session, &fields),
        Command::Update { position, fields } => run_update(session, position, &fields),
        Command::Delete { position, yes } => run_delete(session, position, yes),
        Command::List { search, page } => run_list(session, search.as_deref(), page),
        Command::Import {
            file,
            yes,
            positional,
        } => run_import(session, &file, yes, positional),
        Command::Export { output } => run_export(session, output),
        Command::Browse => {
            if !should_enable_interactive() {
                return Err(VoterRegistryError::InvalidArgument(
                    "browse needs an interactive terminal".to_string(),
                ));
            }
            run_tui(session)
        }
        Command::Validate { .. } | Command::Age { .. } => Ok(()),
    }
}

fn run_add(session: &mut Session<Gateway>, fields: &RecordFields) -> Result<(), VoterRegistryError> {
    let mut record = fields.merge_into(VoterRecord::default());
    if fields.wants_derived_age() {
        record.derive_age_and_eligibility(session.today())?;
    }
    let position = session.add(record)?;
    println!("Voter registered as #{}", position + 1);
    Ok(())
}

fn run_update(
    session: &mut Session<Gateway>,
    position: usize,
    fields: &RecordFields,
) -> Result<(), VoterRegistryError> {
    let index = position - 1;
    let current = existing(session, index)?.clone();
    let mut record = fields.merge_into(current);
    if fields.wants_derived_age() {
        record.derive_age_and_eligibility(session.today())?;
    }
    session.update_at(index, record)?;
    println!("Voter record #{} updated", position);
    Ok(())
}

fn run_delete(
    session: &mut Session<Gateway>,
    position: usize,
    yes: bool,
) -> Result<(), VoterRegistryError> {
    let index = position - 1;
    let name = existing(session, index)?.name.clone();
    if !yes && !confirm(&format!("Delete the voter record for {}?", name))? {
        println!("Nothing deleted");
        return Ok(());
    }
    let removed = session.delete_at(index)?;
    println!("Voter record for {} deleted", removed.name);
    Ok(())
}

fn existing(session: &Session<Gateway>, index: usize) -> Result<&VoterRecord, VoterRegistryError> {
    session
        .store()
        .entries()
        .get(index)
        .map(|e| &e.record)
        .ok_or_else(|| {
            StoreError::OutOfRange {
                position: index,
                len: session.len(),
            }
            .into()
        })
}

fn run_list(
    session: &mut Session<Gateway>,
    search: Option<&str>,
    page: usize,
) -> Result<(), VoterRegistryError> {
    if let Some(query) = search {
        session.set_search(query);
    }
    session.go_to_page(page);
    print_page(&session.page(), session.view().rows_per_page());
    Ok(())
}

fn print_page(page: &Page<'_>, rows_per_page: usize) {
    if page.is_empty() {
        println!("No voter records found");
        return;
    }
    println!(
        "{:>5}  {:<22} {:<10} {:>3} {:<3} {:<12} {:<14} {:<14} {:<14}",
        "#", "Name", "DOB", "Age", "Elg", "Voter ID", "Phone", "District", "City"
    );
    for row in &page.rows {
        let r = row.record;
        println!(
            "{:>5}  {:<22} {:<10} {:>3} {:<3} {:<12} {:<14} {:<14} {:<14}",
            row.position + 1,
            r.name,
            r.date_of_birth,
            r.age,
            r.eligibility,
            r.voter_id,
            r.phone,
            r.district,
            r.city
        );
    }
    let buttons = page
        .buttons
        .clone()
        .map(|range| {
            range
                .map(|n| {
                    if n == page.current_page {
                        format!("[{}]", n)
                    } else {
                        n.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    println!();
    println!(
        "Page {} of {} ({} records, {} per page)  {}",
        page.current_page, page.total_pages, page.visible_count, rows_per_page, buttons
    );
}

fn run_import(
    session: &mut Session<Gateway>,
    file: &Path,
    yes: bool,
    positional: bool,
) -> Result<(), VoterRegistryError> {
    if positional {
        session.set_header_policy(HeaderPolicy::Positional);
    }
    let mut prompt_error = None;
    let outcome = session.import_file(file, |preview: &ImportPreview| {
        if yes {
            return true;
        }
        let question = format!(
            "Replace {} existing records with {} records from {} ({} lines skipped)?",
            preview.existing,
            preview.incoming,
            file.display(),
            preview.skipped
        );
        confirm(&question).unwrap_or_else(|e| {
            prompt_error = Some(e);
            false
        })
    })?;
    if let Some(e) = prompt_error {
        return Err(e.into());
    }

    match outcome {
        ImportOutcome::Imported { count, skipped } => {
            println!("Successfully imported {} voter records", count);
            if skipped > 0 {
                println!("Skipped {} lines with too few fields", skipped);
            }
        }
        ImportOutcome::Cancelled => println!("Import cancelled"),
    }
    Ok(())
}

fn run_export(
    session: &mut Session<Gateway>,
    output: Option<PathBuf>,
) -> Result<(), VoterRegistryError> {
    let path = output.unwrap_or_else(|| PathBuf::from(export_filename(session.today())));
    let stats = session.export(&path)?;
    println!(
        "Exported {} voter records to {}",
        stats.total_records,
        path.display()
    );
    Ok(())
}

/// Prints the validation report for a CSV file.
///
/// Fails with `ValidationFailed` when the file would not import cleanly.
fn run_validate(file: &Path, positional: bool) -> Result<(), VoterRegistryError> {
    eprintln!("Validating file: {}", file.display());
    let policy = if positional {
        HeaderPolicy::Positional
    } else {
        HeaderPolicy::Strict
    };
    let stats = CsvValidator::new(policy).validate(file)?;
    println!("{}", stats);

    if stats.is_valid() {
        eprintln!(
            "Validation complete. All {} records are valid.",
            stats.valid_records
        );
        Ok(())
    } else {
        Err(VoterRegistryError::ValidationFailed(format!(
            "{} of {} records have issues",
            stats.invalid_records, stats.total_records
        )))
    }
}

fn run_age(dob: &str, on: Option<&str>) -> Result<(), VoterRegistryError> {
    let birth = parse_date_of_birth(dob)?;
    let today = match on {
        Some(date) => parse_date_of_birth(date)?,
        None => chrono::Local::now().date_naive(),
    };
    if birth > today {
        return Err(ValidationError::FutureDate(dob.to_string()).into());
    }
    let age = derive_age(birth, today);
    println!("Age: {}", age);
    println!("Eligible: {}", Eligibility::from_age(age));
    Ok(())
}

/// Asks a yes/no question on stdin; anything but y/yes is no.
fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Map an error to its exit code.
fn error_to_exit_code(error: &VoterRegistryError) -> u8 {
    match error {
        VoterRegistryError::InvalidArgument(_) => EXIT_CONFIG_ERROR,
        VoterRegistryError::Config(_) => EXIT_CONFIG_ERROR,
        VoterRegistryError::Validation(_) => EXIT_VALIDATION_FAILURE,
        VoterRegistryError::ValidationFailed(_) => EXIT_VALIDATION_FAILURE,
        VoterRegistryError::Import(_) => EXIT_VALIDATION_FAILURE,
        VoterRegistryError::Io(_) => EXIT_IO_ERROR,
        VoterRegistryError::Json(_) => EXIT_IO_ERROR,
        VoterRegistryError::StorageUnavailable(_) => EXIT_IO_ERROR,
        VoterRegistryError::Store(_) => EXIT_RUNTIME_ERROR,
        VoterRegistryError::NothingToExport => EXIT_RUNTIME_ERROR,
    }
}
