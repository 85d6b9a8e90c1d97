use ratatui::style::{Color, Modifier, Style};

const BASE03: Color = Color::Indexed(234);
const BASE02: Color = Color::Indexed(235);
const BASE01: Color = Color::Indexed(240);
const BASE0: Color = Color::Indexed(244);
const BASE1: Color = Color::Indexed(245);
const BASE2: Color = Color::Indexed(254);
const BASE3: Color = Color::Indexed(230);
const YELLOW: Color = Color::Indexed(136);
const ORANGE: Color = Color::Indexed(166);
const RED: Color = Color::Indexed(124);
const BLUE: Color = Color::Indexed(33);
const CYAN: Color = Color::Indexed(37);
const GREEN: Color = Color::Indexed(64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Info,
    Success,
    Warning,
    Error,
}

// First match wins, so error words are checked before success words.
const ISSUE_STATUS_TONES: &[(StatusTone, &[&str])] = &[
    (
        StatusTone::Error,
        &["failed", "rejected", "cancelled", "canceled", "won't do"],
    ),
    (
        StatusTone::Success,
        &["done", "closed", "resolved", "complete", "released", "deployed"],
    ),
    (
        StatusTone::Warning,
        &["blocked", "on hold", "pending", "waiting", "to do", "todo", "backlog"],
    ),
    (
        StatusTone::Info,
        &["progress", "review", "testing", "qa", "ready"],
    ),
];

const STATUS_LINE_TONES: &[(StatusTone, &[&str])] = &[
    (StatusTone::Error, &["error", "failed", "unable", "invalid"]),
    (StatusTone::Warning, &["warning", "mock", "no issues"]),
    (StatusTone::Success, &["loaded", "opened", "sorted"]),
    (StatusTone::Info, &["loading", "filter"]),
];

impl StatusTone {
    pub fn for_issue_status(status: &str) -> Self {
        classify(status, ISSUE_STATUS_TONES)
    }

    pub fn for_status_line(line: &str) -> Self {
        classify(line, STATUS_LINE_TONES)
    }
}

fn classify(text: &str, table: &[(StatusTone, &[&str])]) -> StatusTone {
    let lowered = text.to_lowercase();
    table
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|pattern| lowered.contains(pattern)))
        .map(|(tone, _)| *tone)
        .unwrap_or(StatusTone::Neutral)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme;

impl Theme {
    pub fn solarized_warm() -> Self {
        Self
    }

    pub fn screen(self) -> Style {
        Style::default().bg(BASE03).fg(BASE0)
    }

    pub fn panel_border(self) -> Style {
        Style::default().fg(BASE01)
    }

    pub fn panel_title(self) -> Style {
        Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
    }

    pub fn table_header(self, under_cursor: bool) -> Style {
        let style = Style::default()
            .bg(BASE02)
            .fg(BASE2)
            .add_modifier(Modifier::BOLD);
        if under_cursor {
            style.fg(CYAN).add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn sort_indicator(self) -> Style {
        Style::default().fg(ORANGE).add_modifier(Modifier::BOLD)
    }

    pub fn filter_cell(self, editing: bool) -> Style {
        if editing {
            Style::default()
                .bg(BASE02)
                .fg(CYAN)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(BASE02).fg(BASE1)
        }
    }

    pub fn table_row(self) -> Style {
        Style::default().bg(BASE03).fg(BASE0)
    }

    pub fn table_status(self, status: &str) -> Style {
        self.status(StatusTone::for_issue_status(status))
    }

    pub fn table_selected(self) -> Style {
        Style::default()
            .bg(BLUE)
            .fg(BASE3)
            .add_modifier(Modifier::BOLD)
    }

    pub fn placeholder(self) -> Style {
        Style::default().fg(BASE1).add_modifier(Modifier::DIM)
    }

    pub fn fetch_error(self) -> Style {
        Style::default().fg(RED).add_modifier(Modifier::BOLD)
    }

    pub fn footer_base(self) -> Style {
        Style::default().bg(BASE02).fg(BASE1)
    }

    pub fn footer_mode(self) -> Style {
        Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
    }

    pub fn footer_hint(self) -> Style {
        Style::default().fg(BASE0)
    }

    pub fn status(self, tone: StatusTone) -> Style {
        match tone {
            StatusTone::Neutral => Style::default().fg(BASE1),
            StatusTone::Info => Style::default().fg(CYAN),
            StatusTone::Success => Style::default().fg(GREEN).add_modifier(Modifier::BOLD),
            StatusTone::Warning => Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
            StatusTone::Error => Style::default().fg(RED).add_modifier(Modifier::BOLD),
        }
    }
}
