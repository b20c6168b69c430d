//! CLI argument parsing module
//!
//! Handles command-line argument parsing using `clap` derive macros.
//! Global flags select storage, configuration and logging; a subcommand
//! selects the operation. Without a subcommand the interactive browser
//! starts.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::record::VoterRecord;

/// Command-line arguments for the voter registry.
///
/// Use the `validate()` method after parsing to reject values clap cannot
/// check on its own, then [`apply_to`](Args::apply_to) to layer the flags
/// over the loaded [`Config`].
///
/// # Example
///
/// ```rust,ignore
/// use clap::Parser;
/// use voter_registry::cli::Args;
///
/// let args = Args::parse();
/// args.validate()?;
/// ```
#[derive(Parser, Debug)]
#[command(name = "voter-registry")]
#[command(about = "Manage voter registration records")]
#[command(version)]
pub struct Args {
    /// JSON file holding the stored records (default: voter_data.json)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only write records on exit or explicit save, not after every change
    #[arg(long, global = true, default_value = "false")]
    pub no_auto_persist: bool,

    /// Keep records in memory only; nothing is loaded or saved
    #[arg(long, global = true, default_value = "false")]
    pub no_storage: bool,

    /// Rows per page in listings and the browser
    #[arg(long, global = true)]
    pub rows_per_page: Option<usize>,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value = "false")]
    pub json_logs: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Operations. Positions are 1-based row numbers as printed by `list`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a voter record
    Add(RecordFields),

    /// Change fields of the record at POSITION
    Update {
        position: usize,
        #[command(flatten)]
        fields: RecordFields,
    },

    /// Delete the record at POSITION
    Delete {
        position: usize,
        /// Delete without asking for confirmation
        #[arg(long, short = 'y', default_value = "false")]
        yes: bool,
    },

    /// Print one page of records
    List {
        /// Only records with a field containing this text (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Page to print
        #[arg(long, short = 'p', default_value = "1")]
        page: usize,
    },

    /// Replace all records with the contents of a CSV file
    Import {
        file: PathBuf,
        /// Replace without asking for confirmation
        #[arg(long, short = 'y', default_value = "false")]
        yes: bool,
        /// Skip the header check and read columns by position
        #[arg(long, default_value = "false")]
        positional: bool,
    },

    /// Write all records to a CSV file
    Export {
        /// Output path (default: voter_data_<date>.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Check a CSV file without importing it
    Validate {
        file: PathBuf,
        /// Skip the header check and read columns by position
        #[arg(long, default_value = "false")]
        positional: bool,
    },

    /// Browse and edit records interactively
    Browse,

    /// Print the age and eligibility for a date of birth
    Age {
        /// Date of birth, YYYY-MM-DD
        dob: String,
        /// Reference date instead of today, YYYY-MM-DD
        #[arg(long)]
        on: Option<String>,
    },
}

/// Record fields given on the command line.
///
/// Every field is optional so the same flags serve `add` and `update`;
/// `add` reports missing required fields through record validation.
#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: Option<String>,
    /// Derived from --dob when omitted
    #[arg(long)]
    pub age: Option<String>,
    /// Yes or No; derived from --dob when omitted
    #[arg(long)]
    pub eligibility: Option<String>,
    #[arg(long)]
    pub voter_id: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub pincode: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

impl RecordFields {
    /// True if neither age nor eligibility was given and a date of birth was.
    pub fn wants_derived_age(&self) -> bool {
        self.dob.is_some() && self.age.is_none() && self.eligibility.is_none()
    }

    pub fn is_empty(&self) -> bool {
        *self == RecordFields::default()
    }

    /// Overwrites the fields of `base` that were given.
    pub fn merge_into(&self, mut base: VoterRecord) -> VoterRecord {
        let pairs: [(&Option<String>, &mut String); 12] = [
            (&self.name, &mut base.name),
            (&self.dob, &mut base.date_of_birth),
            (&self.age, &mut base.age),
            (&self.eligibility, &mut base.eligibility),
            (&self.voter_id, &mut base.voter_id),
            (&self.phone, &mut base.phone),
            (&self.district, &mut base.district),
            (&self.city, &mut base.city),
            (&self.area, &mut base.area),
            (&self.street, &mut base.street),
            (&self.pincode, &mut base.pincode),
            (&self.address, &mut base.address),
        ];
        for (given, field) in pairs {
            if let Some(value) = given {
                *field = value.clone();
            }
        }
        base
    }
}

impl Args {
    /// Validate argument combinations.
    ///
    /// - `--rows-per-page` must be greater than zero
    /// - positions and `--page` are 1-based
    /// - `--no-storage` cannot be combined with `--data-file`
    /// - `update` needs at least one field flag
    pub fn validate(&self) -> Result<(), String> {
        if self.rows_per_page == Some(0) {
            return Err("--rows-per-page must be greater than zero".to_string());
        }

        if self.no_storage && self.data_file.is_some() {
            return Err("--no-storage cannot be used with --data-file".to_string());
        }

        match &self.command {
            Some(Command::Update { position, fields }) => {
                check_position(*position)?;
                if fields.is_empty() {
                    return Err("update requires at least one field to change".to_string());
                }
            }
            Some(Command::Delete { position, .. }) => check_position(*position)?,
            Some(Command::List { page, .. }) if *page == 0 => {
                return Err("--page starts at 1".to_string());
            }
            _ => {}
        }

        Ok(())
    }

    /// Layers command-line flags over `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(data_file) = &self.data_file {
            config.data_file = data_file.clone();
        }
        if self.no_auto_persist {
            config.auto_persist = false;
        }
        if let Some(rows_per_page) = self.rows_per_page {
            config.rows_per_page = rows_per_page;
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        if self.json_logs {
            config.json_logs = true;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
    }

    /// The subcommand, defaulting to the browser.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Browse)
    }
}

fn check_position(position: usize) -> Result<(), String> {
    if position == 0 {
        return Err("positions start at 1".to_string());
    }
    Ok(())
}
