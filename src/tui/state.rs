//! Browser state and key handling
//!
//! [`TuiState`] holds everything the browser shows besides the records
//! themselves: the input mode, the text being typed, the selected row, the
//! status line and pending confirmations. Keys are applied to a
//! [`Session`] through [`TuiState::handle_key`], which never touches the
//! terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use tracing::{info, warn};

use crate::csv_handler::export_filename;
use crate::persistence::PersistenceGateway;
use crate::session::{ImportOutcome, Session};
use crate::tui::types::{
    next_rows_per_page, prev_rows_per_page, InputMode, PendingImport, RecordForm, StatusMessage,
};

/// State of the interactive browser.
#[derive(Debug, Clone)]
pub struct TuiState {
    pub mode: InputMode,
    /// Text typed in the search bar or a path prompt.
    pub input: String,
    /// Selected row on the current page.
    pub selected: usize,
    pub status: Option<StatusMessage>,
    pub form: Option<RecordForm>,
    pub pending_import: Option<PendingImport>,
    quit: bool,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            mode: InputMode::Normal,
            input: String::new(),
            selected: 0,
            status: None,
            form: None,
            pending_import: None,
            quit: false,
        }
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit
    }

    /// Applies one key press.
    pub fn handle_key<G: PersistenceGateway>(&mut self, session: &mut Session<G>, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }
        if self.mode != InputMode::Form {
            self.status = None;
        }

        match self.mode.clone() {
            InputMode::Normal => self.handle_normal(session, key.code),
            InputMode::Search => self.handle_search(session, key.code),
            InputMode::ImportPath => self.handle_import_path(session, key.code),
            InputMode::ConfirmImport => self.handle_confirm_import(session, key.code),
            InputMode::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    match session.delete(id) {
                        Ok(_) => {
                            self.status = Some(StatusMessage::success(format!(
                                "Voter record for {} deleted",
                                name
                            )))
                        }
                        Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
                    }
                    self.mode = InputMode::Normal;
                    self.clamp_selection(session);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.mode = InputMode::Normal;
                }
                _ => {}
            },
            InputMode::Form => self.handle_form(session, key.code),
        }
    }

    fn handle_normal<G: PersistenceGateway>(&mut self, session: &mut Session<G>, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('/') => {
                self.input = session.view().search_query().to_string();
                self.mode = InputMode::Search;
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected += 1;
                self.clamp_selection(session);
            }
            KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => {
                session.next_page();
                self.selected = 0;
            }
            KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => {
                session.prev_page();
                self.selected = 0;
            }
            KeyCode::Home => {
                session.go_to_page(1);
                self.selected = 0;
            }
            KeyCode::End => {
                session.go_to_page(session.view().total_pages(session.store()));
                self.selected = 0;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let page = c as usize - '0' as usize;
                session.go_to_page(page);
                self.selected = 0;
            }
            KeyCode::Char('+') => {
                self.change_rows_per_page(session, next_rows_per_page(session.view().rows_per_page()))
            }
            KeyCode::Char('-') => {
                self.change_rows_per_page(session, prev_rows_per_page(session.view().rows_per_page()))
            }
            KeyCode::Char('a') => {
                self.form = Some(RecordForm::new());
                self.mode = InputMode::Form;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = session.id_for_row(self.selected) {
                    if let Some(record) = session.store().get(id) {
                        self.form = Some(RecordForm::edit(id, record));
                        self.mode = InputMode::Form;
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = session.id_for_row(self.selected) {
                    let name = session
                        .store()
                        .get(id)
                        .map(|r| r.name.clone())
                        .unwrap_or_default();
                    self.mode = InputMode::ConfirmDelete { id, name };
                }
            }
            KeyCode::Char('i') => {
                self.input.clear();
                self.mode = InputMode::ImportPath;
            }
            KeyCode::Char('x') => self.export(session),
            KeyCode::Char('s') => match session.save() {
                Ok(()) => self.status = Some(StatusMessage::success("Records saved")),
                Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
            },
            _ => {}
        }
    }

    fn handle_search<G: PersistenceGateway>(&mut self, session: &mut Session<G>, code: KeyCode) {
        match code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.input.clear();
                session.set_search("");
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
                session.set_search(&self.input);
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                session.set_search(&self.input);
            }
            _ => {}
        }
        self.selected = 0;
    }

    fn handle_import_path<G: PersistenceGateway>(
        &mut self,
        session: &mut Session<G>,
        code: KeyCode,
    ) {
        match code {
            KeyCode::Enter => {
                let path = self.input.trim().to_string();
                self.input.clear();
                self.mode = InputMode::Normal;
                if path.is_empty() {
                    return;
                }
                self.prepare_import(session, path);
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Reads and decodes the file, then asks for confirmation.
    fn prepare_import<G: PersistenceGateway>(&mut self, session: &mut Session<G>, path: String) {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path, error = %e, "cannot read import file");
                self.status = Some(StatusMessage::error(format!("Cannot read {}: {}", path, e)));
                return;
            }
        };
        match session.preview_import(&text) {
            Ok(preview) => {
                self.pending_import = Some(PendingImport {
                    path,
                    text,
                    preview,
                });
                self.mode = InputMode::ConfirmImport;
            }
            Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
        }
    }

    fn handle_confirm_import<G: PersistenceGateway>(
        &mut self,
        session: &mut Session<G>,
        code: KeyCode,
    ) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(pending) = self.pending_import.take() {
                    match session.import_text(&pending.text, |_| true) {
                        Ok(ImportOutcome::Imported { count, skipped }) => {
                            info!(path = %pending.path, count, skipped, "imported from browser");
                            self.status = Some(StatusMessage::success(format!(
                                "Imported {} voter records ({} lines skipped)",
                                count, skipped
                            )));
                        }
                        Ok(ImportOutcome::Cancelled) => {}
                        Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
                    }
                    self.selected = 0;
                }
                self.mode = InputMode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_import = None;
                self.status = Some(StatusMessage::success("Import cancelled"));
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_form<G: PersistenceGateway>(&mut self, session: &mut Session<G>, code: KeyCode) {
        let Some(form) = self.form.as_mut() else {
            self.mode = InputMode::Normal;
            return;
        };
        match code {
            KeyCode::Esc => {
                self.form = None;
                self.status = None;
                self.mode = InputMode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Char(c) => form.focused_mut().push(c),
            KeyCode::Enter => self.submit_form(session),
            _ => {}
        }
    }

    fn submit_form<G: PersistenceGateway>(&mut self, session: &mut Session<G>) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let mut record = form.to_record();
        if form.wants_derived_age() {
            if let Err(e) = record.derive_age_and_eligibility(session.today()) {
                self.status = Some(StatusMessage::error(e.to_string()));
                return;
            }
        }
        let result = match form.target {
            Some(id) => session
                .update(id, record)
                .map(|_| "Voter record updated".to_string()),
            None => session
                .add(record)
                .map(|_| "Voter registered".to_string()),
        };
        match result {
            Ok(message) => {
                self.status = Some(StatusMessage::success(message));
                self.form = None;
                self.mode = InputMode::Normal;
            }
            Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
        }
    }

    fn change_rows_per_page<G: PersistenceGateway>(
        &mut self,
        session: &mut Session<G>,
        rows_per_page: usize,
    ) {
        if let Err(e) = session.set_rows_per_page(rows_per_page) {
            self.status = Some(StatusMessage::error(e.to_string()));
        }
        self.selected = 0;
    }

    fn export<G: PersistenceGateway>(&mut self, session: &Session<G>) {
        let filename = export_filename(session.today());
        match session.export(Path::new(&filename)) {
            Ok(stats) => {
                self.status = Some(StatusMessage::success(format!(
                    "Exported {} records to {}",
                    stats.total_records, filename
                )))
            }
            Err(e) => self.status = Some(StatusMessage::error(e.to_string())),
        }
    }

    /// Keeps the selection on an existing row of the current page.
    pub fn clamp_selection<G: PersistenceGateway>(&mut self, session: &Session<G>) {
        let rows = session.page().rows.len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }
}
