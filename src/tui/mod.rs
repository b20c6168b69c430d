//! Interactive record browser for voter-registry

pub mod input;
pub mod render;
pub mod state;
pub mod types;

pub use input::run_tui;
pub use state::TuiState;
pub use types::{should_enable_interactive, InputMode, RecordForm, StatusMessage};
