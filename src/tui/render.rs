//! Terminal rendering and management

use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Padding, Paragraph, Row, Table, Wrap},
};
use std::io::{stdout, Stdout};

use crate::persistence::PersistenceGateway;
use crate::session::Session;
use crate::tui::state::TuiState;
use crate::tui::types::{InputMode, StatusKind};
use crate::view::Page;

/// Columns shown in the table, as `(title, width)`.
const COLUMNS: [(&str, u16); 9] = [
    ("#", 5),
    ("Name", 22),
    ("DOB", 11),
    ("Age", 4),
    ("Eligible", 8),
    ("Voter ID", 12),
    ("Phone", 14),
    ("District", 14),
    ("City", 14),
];

/// Terminal wrapper for cleanup on drop
pub struct Terminal {
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
}

impl Terminal {
    pub fn new() -> std::io::Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout());
        let terminal = ratatui::Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    pub fn draw<G: PersistenceGateway>(
        &mut self,
        session: &Session<G>,
        state: &TuiState,
    ) -> std::io::Result<()> {
        self.terminal
            .draw(|frame| draw_browser(frame, session, state))?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Draws the whole browser into `frame`.
pub fn draw_browser<G: PersistenceGateway>(frame: &mut Frame, session: &Session<G>, state: &TuiState) {
    let area = frame.area();
    let page = session.page();
    let dim = Style::default().fg(Color::DarkGray);

    let (storage_label, storage_color) = if !session.storage_available() {
        ("storage unavailable", Color::Red)
    } else if session.is_dirty() {
        ("unsaved changes", Color::Yellow)
    } else {
        ("saved", Color::Green)
    };
    let outer = Block::default()
        .title(" voter-registry ")
        .title_bottom(
            Line::from(Span::styled(
                format!(" {} ", storage_label),
                Style::default().fg(storage_color),
            ))
            .alignment(Alignment::Right),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let vert = Layout::vertical([
        Constraint::Length(3), // Search
        Constraint::Min(5),    // Table
        Constraint::Length(1), // Pages
        Constraint::Length(1), // Status
        Constraint::Length(2), // Controls
    ])
    .split(inner);

    draw_search(frame, vert[0], session, state);
    draw_table(frame, vert[1], &page, state.selected);
    frame.render_widget(Paragraph::new(page_bar(&page, session.view().rows_per_page())), vert[2]);

    if let Some(status) = &state.status {
        let color = match status.kind {
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", status.text),
                Style::default().fg(color),
            )),
            vert[3],
        );
    }

    frame.render_widget(
        Paragraph::new(controls(state)).style(dim).wrap(Wrap { trim: false }),
        vert[4],
    );

    if state.mode == InputMode::Form {
        draw_form(frame, area, state);
    }
}

fn draw_search<G: PersistenceGateway>(
    frame: &mut Frame,
    area: Rect,
    session: &Session<G>,
    state: &TuiState,
) {
    let editing = state.mode == InputMode::Search;
    let query = if editing {
        state.input.as_str()
    } else {
        session.view().search_query()
    };
    let mut spans = vec![Span::styled(query.to_string(), Style::default().fg(Color::White))];
    if editing {
        spans.push(Span::styled("█", Style::default().fg(Color::White)));
    } else if query.is_empty() {
        spans.push(Span::styled(
            "press / to search",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .padding(Padding::horizontal(1));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_table(frame: &mut Frame, area: Rect, page: &Page<'_>, selected: usize) {
    if page.is_empty() {
        frame.render_widget(
            Paragraph::new("No voter records found")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    }

    let header = Row::new(COLUMNS.iter().map(|(title, _)| Cell::from(*title)))
        .style(Style::default().fg(Color::Cyan).bold());
    let rows = page.rows.iter().enumerate().map(|(i, row)| {
        let r = row.record;
        let eligible_color = match r.eligibility.trim() {
            "Yes" => Color::Green,
            "No" => Color::Red,
            _ => Color::White,
        };
        let cells = vec![
            Cell::from((row.position + 1).to_string()),
            Cell::from(r.name.as_str()),
            Cell::from(r.date_of_birth.as_str()),
            Cell::from(r.age.as_str()),
            Cell::from(Span::styled(
                r.eligibility.as_str(),
                Style::default().fg(eligible_color),
            )),
            Cell::from(r.voter_id.as_str()),
            Cell::from(r.phone.as_str()),
            Cell::from(r.district.as_str()),
            Cell::from(r.city.as_str()),
        ];
        let style = if i == selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };
        Row::new(cells).style(style)
    });
    let widths = COLUMNS.iter().map(|(_, w)| Constraint::Length(*w));
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

/// Previous/next controls, the page-button window and the summary.
fn page_bar(page: &Page<'_>, rows_per_page: usize) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let Some(buttons) = page.buttons.clone() else {
        return Line::from(Span::styled(
            format!(" 0 records · {} per page", rows_per_page),
            dim,
        ));
    };

    let mut spans = vec![Span::styled(
        " ◀ Prev ",
        if page.has_prev() { Style::default() } else { dim },
    )];
    for n in buttons {
        if n == page.current_page {
            spans.push(Span::styled(
                format!("[{}]", n),
                Style::default().fg(Color::Yellow).bold(),
            ));
        } else {
            spans.push(Span::raw(format!(" {} ", n)));
        }
    }
    spans.push(Span::styled(
        " Next ▶ ",
        if page.has_next() { Style::default() } else { dim },
    ));
    spans.push(Span::styled(
        format!(
            "  Page {} of {} · {} records · {} per page",
            page.current_page, page.total_pages, page.visible_count, rows_per_page
        ),
        dim,
    ));
    Line::from(spans)
}

fn controls(state: &TuiState) -> Line<'_> {
    match &state.mode {
        InputMode::Normal => Line::from(
            " [/] Search  [a] Add  [e] Edit  [d] Delete  [n/p] Page  [1-9] Go to  [+/-] Rows  \
             [i] Import  [x] Export  [s] Save  [q] Quit",
        ),
        InputMode::Search => Line::from(" Type to filter  [Enter] Keep  [Esc] Clear"),
        InputMode::ImportPath => Line::from(vec![
            " Import CSV: ".into(),
            Span::styled(state.input.as_str(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::White)),
            "  [Enter] Import  [Esc] Cancel".into(),
        ]),
        InputMode::ConfirmImport => {
            let text = match &state.pending_import {
                Some(p) => format!(
                    " Replace {} existing records with {} from {} ({} lines skipped)? [y/n]",
                    p.preview.existing, p.preview.incoming, p.path, p.preview.skipped
                ),
                None => " Replace all records? [y/n]".to_string(),
            };
            Line::from(Span::styled(text, Style::default().fg(Color::Yellow)))
        }
        InputMode::ConfirmDelete { name, .. } => Line::from(Span::styled(
            format!(" Delete the voter record for {}? [y/n]", name),
            Style::default().fg(Color::Yellow),
        )),
        InputMode::Form => Line::from(" [Tab/↑↓] Field  [Enter] Save  [Esc] Cancel"),
    }
}

fn draw_form(frame: &mut Frame, area: Rect, state: &TuiState) {
    let Some(form) = &state.form else {
        return;
    };
    let popup = centered(area, 60, 16);
    frame.render_widget(Clear, popup);

    let title = if form.target.is_some() {
        " Edit voter "
    } else {
        " Register voter "
    };
    let lines: Vec<Line> = form
        .values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let focused = i == form.focus;
            let label_style = if focused {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::Cyan)
            };
            let mut spans = vec![
                Span::styled(format!("{:>12}: ", form.label(i)), label_style),
                Span::raw(value.as_str()),
            ];
            if focused {
                spans.push(Span::styled("█", Style::default().fg(Color::White)));
            }
            Line::from(spans)
        })
        .collect();
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .padding(Padding::horizontal(1));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
