//! TUI main event loop

use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;
use tracing::info;

use crate::error::VoterRegistryError;
use crate::persistence::PersistenceGateway;
use crate::session::Session;
use crate::tui::{render::Terminal, state::TuiState};

/// Run the browser until quit is requested, then flush pending changes.
///
/// The terminal is restored before the flush so that a failing save is
/// reported on the normal screen.
pub fn run_tui<G: PersistenceGateway>(session: &mut Session<G>) -> Result<(), VoterRegistryError> {
    let mut state = TuiState::new();
    {
        let mut terminal = Terminal::new()?;
        info!(records = session.len(), "browser started");

        loop {
            terminal.draw(session, &state)?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        state.handle_key(session, key);
                    }
                }
            }

            if state.is_quit_requested() {
                break;
            }
        }
    }

    info!("browser closed");
    session.flush_on_exit()
}
