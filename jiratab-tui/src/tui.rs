use std::{
    io,
    sync::mpsc::{self, Sender},
    time::Duration,
};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use jiratab_domain::Column;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::{
    app::{App, FetchResult},
    theme::{StatusTone, Theme},
};

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

const HEADER_HEIGHT: u16 = 2;

const COLUMN_WIDTHS: [Constraint; 7] = [
    Constraint::Length(12),
    Constraint::Length(10),
    Constraint::Min(24),
    Constraint::Length(14),
    Constraint::Length(11),
    Constraint::Length(11),
    Constraint::Length(11),
];

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    let (fetch_tx, fetch_rx) = mpsc::channel::<FetchResult>();
    app.reload(&fetch_tx);

    loop {
        while let Ok(message) = fetch_rx.try_recv() {
            app.ingest_fetch_result(message);
        }

        terminal.draw(|frame| draw_ui(frame, &app))?;

        if event::poll(Duration::from_millis(100))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };

            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_key_event(&mut app, key, &fetch_tx) == KeyOutcome::Quit {
                return Ok(());
            }
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent, fetch_tx: &Sender<FetchResult>) -> KeyOutcome {
    if app.filter_mode {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.finish_filter_input(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.clear_cursor_filter();
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Left => app.prev_column(),
            KeyCode::Right | KeyCode::Tab => app.next_column(),
            _ => {}
        }
        return KeyOutcome::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyOutcome::Quit;
        }
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('h') | KeyCode::Left => app.prev_column(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => app.next_column(),
        KeyCode::Char('s') => app.sort_by_cursor_column(),
        KeyCode::Char(digit @ '1'..='7') => {
            let index = digit as usize - '1' as usize;
            app.sort_by(Column::ALL[index]);
        }
        KeyCode::Char('f') | KeyCode::Char('/') => app.start_filter_input(),
        KeyCode::Char('x') => app.clear_cursor_filter(),
        KeyCode::Char('r') => app.reload(fetch_tx),
        KeyCode::Char('o') | KeyCode::Enter => app.open_selected_issue(),
        _ => {}
    }
    KeyOutcome::Continue
}

fn header_row(app: &App, theme: Theme) -> Row<'static> {
    let cells = Column::ALL.into_iter().map(|column| {
        let under_cursor = column == app.column;
        let editing = app.filter_mode && under_cursor;
        let pattern = app.filter_pattern(column);
        let filter_text = if editing {
            format!("{pattern}_")
        } else if pattern.is_empty() {
            "·".to_string()
        } else {
            pattern.to_string()
        };

        let label = app.header_label(column);
        let title = match label.strip_prefix(column.title()) {
            Some(indicator) if !indicator.is_empty() => Line::from(vec![
                Span::styled(column.title().to_string(), theme.table_header(under_cursor)),
                Span::styled(indicator.to_string(), theme.sort_indicator()),
            ]),
            _ => Line::from(Span::styled(label, theme.table_header(under_cursor))),
        };

        Cell::from(Text::from(vec![
            title,
            Line::from(Span::styled(filter_text, theme.filter_cell(editing))),
        ]))
    });

    Row::new(cells)
        .height(HEADER_HEIGHT)
        .style(theme.table_header(false))
}

fn body_rows(app: &App, theme: Theme) -> Vec<Row<'static>> {
    app.rows()
        .iter()
        .map(|row| {
            let cells = Column::ALL.into_iter().map(|column| {
                let text = row.cell(column).to_string();
                if column == Column::Status {
                    Cell::from(text).style(theme.table_status(row.cell(column)))
                } else {
                    Cell::from(text)
                }
            });
            Row::new(cells).style(theme.table_row())
        })
        .collect()
}

fn draw_table(frame: &mut Frame, app: &App, theme: Theme, area: Rect) {
    let title = format!(
        " jiratab | {} of {} issues ",
        app.store.visible_len(),
        app.store.source_len()
    );
    let block = Block::default()
        .title(Span::styled(title, theme.panel_title()))
        .borders(Borders::ALL)
        .border_style(theme.panel_border())
        .style(theme.screen());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(message) = app.placeholder_text() else {
        let table = Table::new(body_rows(app, theme), COLUMN_WIDTHS)
            .header(header_row(app, theme))
            .row_highlight_style(theme.table_selected())
            .highlight_symbol("> ");
        let mut state = TableState::default();
        state.select(Some(app.selected));
        frame.render_stateful_widget(table, inner, &mut state);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT + 1), Constraint::Min(0)])
        .split(inner);
    let header_only = Table::new(Vec::<Row>::new(), COLUMN_WIDTHS)
        .header(header_row(app, theme))
        .highlight_symbol("> ");
    frame.render_widget(header_only, chunks[0]);

    let style = if app.has_fetch_error() {
        theme.fetch_error()
    } else {
        theme.placeholder()
    };
    let placeholder = Paragraph::new(message)
        .style(style)
        .wrap(Wrap { trim: false });
    frame.render_widget(placeholder, chunks[1]);
}

fn draw_ui(frame: &mut Frame, app: &App) {
    let theme = Theme::solarized_warm();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    draw_table(frame, app, theme, vertical[0]);

    let (mode, hints) = if app.filter_mode {
        (
            "FILTER",
            "type to filter | Backspace delete | Ctrl+u clear | ←/→ column | Enter/Esc done",
        )
    } else {
        (
            "NORMAL",
            "j/k move | h/l column | s or 1-7 sort | f filter | x clear | r reload | o open | q quit",
        )
    };
    let footer = Line::from(vec![
        Span::styled(format!("[{mode}] "), theme.footer_mode()),
        Span::styled(format!("{hints} | "), theme.footer_hint()),
        Span::styled(
            app.status_line.clone(),
            theme.status(StatusTone::for_status_line(&app.status_line)),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer).style(theme.footer_base()), vertical[1]);
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use jiratab_config::Settings;
    use jiratab_domain::{Column, SortDirection};
    use ratatui::{backend::TestBackend, Terminal};

    use super::{draw_ui, handle_key_event, KeyOutcome};
    use crate::{app::App, types::DashboardSource};

    fn mock_app() -> App {
        let mut app = App::new(DashboardSource {
            settings: Settings::default(),
            mock_only: true,
        });
        let (tx, _rx) = mpsc::channel();
        app.reload(&tx);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        key_with_modifiers(code, KeyModifiers::empty())
    }

    fn key_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn press(app: &mut App, code: KeyCode) -> KeyOutcome {
        let (tx, _rx) = mpsc::channel();
        handle_key_event(app, key(code), &tx)
    }

    #[test]
    fn q_quits_outside_filter_mode() {
        let mut app = mock_app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyOutcome::Quit);
    }

    #[test]
    fn q_is_typed_into_filter_in_filter_mode() {
        let mut app = mock_app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.column, Column::Summary);

        press(&mut app, KeyCode::Char('/'));
        assert!(app.filter_mode);
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyOutcome::Continue);
        assert_eq!(app.filter_pattern(Column::Summary), "q");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter_mode);
        assert_eq!(app.filter_pattern(Column::Summary), "");
    }

    #[test]
    fn digit_keys_sort_like_header_clicks() {
        let mut app = mock_app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.store.sort_spec().column, Column::Status);
        assert_eq!(app.column, Column::Status);

        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.store.sort_spec().direction, SortDirection::Descending);
    }

    #[test]
    fn s_sorts_by_cursor_column() {
        let mut app = mock_app();
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.column, Column::ReleaseDate);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.store.sort_spec().column, Column::ReleaseDate);
        assert_eq!(app.rows()[0].release_date, "N/A");
    }

    #[test]
    fn ctrl_u_clears_filter_while_editing() {
        let mut app = mock_app();
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.rows().len(), 5);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.rows().len(), 1);

        let (tx, _rx) = mpsc::channel();
        handle_key_event(
            &mut app,
            key_with_modifiers(KeyCode::Char('u'), KeyModifiers::CONTROL),
            &tx,
        );
        assert!(app.filter_mode);
        assert_eq!(app.rows().len(), 5);
    }

    #[test]
    fn j_and_k_move_selection_with_wrap() {
        let mut app = mock_app();
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected, 4);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn draws_sort_indicator_and_rows() {
        let app = mock_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).expect("terminal");
        terminal.draw(|frame| draw_ui(frame, &app)).expect("draw");

        let buffer = terminal.backend().buffer();
        let content = buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(content.contains("Key ▲"));
        assert!(content.contains("TAB-101"));
        assert!(content.contains("[NORMAL]"));
    }

    #[test]
    fn draws_placeholder_when_nothing_matches() {
        let mut app = mock_app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('#'));

        let mut terminal = Terminal::new(TestBackend::new(120, 12)).expect("terminal");
        terminal.draw(|frame| draw_ui(frame, &app)).expect("draw");
        let content = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(content.contains("No issues match the current filters"));
    }
}
