//! Voter Registry Library
//!
//! Core functionality for the voter-registry CLI tool: the voter record
//! type, the CSV codec, the in-memory record store, the paginated and
//! searchable view model, the persistence gateway and the session that ties
//! them together, plus the interactive terminal browser.

pub mod cli;
pub mod config;
pub mod csv_handler;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod record;
pub mod session;
pub mod store;
pub mod tui;
pub mod validator;
pub mod view;
