use std::sync::mpsc::Sender;

use jiratab_config::Settings;
use jiratab_domain::{Column, Issue, IssueStore, RowCache, RowRecord, SortDirection};
use jiratab_jira::{FetchError, SearchOutcome};

use crate::{
    mock::mock_issues, types::DashboardSource, utils::compact_error, worker::spawn_fetch,
};

const FETCH_ERROR_HINT: &str =
    "Please check your JQL query and other settings in the jiratab config file.";

#[derive(Debug)]
pub struct FetchRequest {
    pub generation: u64,
    pub settings: Settings,
}

#[derive(Debug)]
pub struct FetchResult {
    pub generation: u64,
    pub result: Result<SearchOutcome, FetchError>,
}

#[derive(Debug)]
pub struct App {
    pub(crate) store: IssueStore<RowCache>,
    pub(crate) source: DashboardSource,
    pub(crate) selected: usize,
    pub(crate) column: Column,
    pub(crate) filter_mode: bool,
    pub(crate) status_line: String,
    fetch_error: Option<String>,
    loaded: bool,
    fetches_in_flight: usize,
    fetch_generation: u64,
}

impl App {
    pub fn new(source: DashboardSource) -> Self {
        Self {
            store: IssueStore::new(RowCache::default()),
            source,
            selected: 0,
            column: Column::Key,
            filter_mode: false,
            status_line: String::new(),
            fetch_error: None,
            loaded: false,
            fetches_in_flight: 0,
            fetch_generation: 0,
        }
    }

    pub fn rows(&self) -> &[RowRecord] {
        self.store.listener().rows()
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.store.visible_issue(self.selected)
    }

    pub(crate) fn selected_issue_key(&self) -> Option<String> {
        self.selected_issue().map(|issue| issue.key.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.fetches_in_flight > 0
    }

    /// Starts a fetch. Mock sources load synchronously; real fetches run on
    /// a worker thread and land through [`App::ingest_fetch_result`].
    pub fn reload(&mut self, fetch_tx: &Sender<FetchResult>) {
        if self.source.mock_only {
            let preferred_key = self.selected_issue_key();
            self.store.set_source(mock_issues());
            self.loaded = true;
            self.fetch_error = None;
            self.status_line = format!("Loaded {} mock issues", self.store.source_len());
            self.normalize_selection_with_preferred_key(preferred_key.as_deref());
            return;
        }

        self.fetch_generation += 1;
        self.fetches_in_flight += 1;
        tracing::info!(
            generation = self.fetch_generation,
            source = %self.source.describe(),
            "starting fetch"
        );
        spawn_fetch(
            FetchRequest {
                generation: self.fetch_generation,
                settings: self.source.settings.clone(),
            },
            fetch_tx.clone(),
        );
        self.status_line = format!("Loading issues ({})", self.source.describe());
    }

    /// Applies a finished fetch. Every result is applied in arrival order,
    /// so the last one to arrive wins.
    pub fn ingest_fetch_result(&mut self, message: FetchResult) {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);

        match message.result {
            Ok(outcome) => {
                let preferred_key = self.selected_issue_key();
                self.store.set_source(outcome.issues);
                self.loaded = true;
                self.fetch_error = None;
                self.status_line = if outcome.warnings.is_empty() {
                    format!("Loaded {} issues", self.store.source_len())
                } else {
                    format!(
                        "Loaded {} issues (warning: {})",
                        self.store.source_len(),
                        compact_error(&outcome.warnings.join(", "))
                    )
                };
                self.normalize_selection_with_preferred_key(preferred_key.as_deref());
            }
            Err(error) => {
                tracing::error!(generation = message.generation, %error, "fetch failed");
                self.status_line = format!("Fetch failed: {}", compact_error(&error.to_string()));
                self.fetch_error = Some(format!("Error fetching Jira tasks: {error}"));
            }
        }
    }

    /// Message shown in place of the table body, if the table has nothing to
    /// show.
    pub fn placeholder_text(&self) -> Option<String> {
        if let Some(error) = &self.fetch_error {
            return Some(format!("{error}\n{FETCH_ERROR_HINT}"));
        }
        if !self.loaded {
            return Some(if self.is_loading() {
                "Loading issues...".to_string()
            } else {
                "No issues loaded yet. Press r to fetch.".to_string()
            });
        }
        if self.store.source_len() == 0 {
            return Some("No issues found".to_string());
        }
        if self.store.visible_len() == 0 {
            return Some("No issues match the current filters".to_string());
        }
        None
    }

    pub fn has_fetch_error(&self) -> bool {
        self.fetch_error.is_some()
    }

    pub fn next(&mut self) {
        let len = self.store.visible_len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    pub fn prev(&mut self) {
        let len = self.store.visible_len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    pub fn next_column(&mut self) {
        let index = (self.column.index() + 1) % Column::ALL.len();
        self.column = Column::ALL[index];
    }

    pub fn prev_column(&mut self) {
        let index = self
            .column
            .index()
            .checked_sub(1)
            .unwrap_or(Column::ALL.len() - 1);
        self.column = Column::ALL[index];
    }

    pub fn sort_by_cursor_column(&mut self) {
        self.sort_by(self.column);
    }

    /// Same effect as clicking a column header.
    pub fn sort_by(&mut self, column: Column) {
        let preferred_key = self.selected_issue_key();
        self.column = column;
        self.store.toggle_sort(column);
        let direction = match self.store.sort_spec().direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        };
        self.status_line = format!("Sorted by {} {direction}", column.title());
        self.normalize_selection_with_preferred_key(preferred_key.as_deref());
    }

    pub fn header_label(&self, column: Column) -> String {
        let sort = self.store.listener().sort();
        if sort.column != column {
            return column.title().to_string();
        }
        let arrow = match sort.direction {
            SortDirection::Ascending => '▲',
            SortDirection::Descending => '▼',
        };
        format!("{} {arrow}", column.title())
    }

    pub fn filter_pattern(&self, column: Column) -> &str {
        self.store.filter_spec().pattern(column).unwrap_or("")
    }

    pub fn start_filter_input(&mut self) {
        self.filter_mode = true;
        self.status_line = format!(
            "Filter {}: type to narrow, Enter/Esc to finish",
            self.column.title()
        );
    }

    pub fn finish_filter_input(&mut self) {
        self.filter_mode = false;
        self.status_line = format!(
            "Filter applied on {}: '{}' ({} of {} issues)",
            self.column.title(),
            self.filter_pattern(self.column),
            self.store.visible_len(),
            self.store.source_len()
        );
    }

    pub fn push_filter_char(&mut self, value: char) {
        let mut pattern = self.filter_pattern(self.column).to_string();
        pattern.push(value);
        self.apply_filter(pattern);
    }

    pub fn pop_filter_char(&mut self) {
        let mut pattern = self.filter_pattern(self.column).to_string();
        pattern.pop();
        self.apply_filter(pattern);
    }

    pub fn clear_cursor_filter(&mut self) {
        self.apply_filter(String::new());
        self.status_line = format!("Filter cleared on {}", self.column.title());
    }

    fn apply_filter(&mut self, pattern: String) {
        let preferred_key = self.selected_issue_key();
        self.store.set_filter(self.column, pattern);
        self.normalize_selection_with_preferred_key(preferred_key.as_deref());
    }

    pub fn normalize_selection_with_preferred_key(&mut self, preferred_key: Option<&str>) {
        let len = self.store.visible_len();
        if len == 0 {
            self.selected = 0;
            return;
        }

        if let Some(key) = preferred_key {
            if let Some(position) = self.store.visible().position(|issue| issue.key == key) {
                self.selected = position;
                return;
            }
        }

        if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn open_selected_issue(&mut self) {
        let Some(key) = self.selected_issue_key() else {
            self.status_line = "No issue selected".to_string();
            return;
        };

        if self.source.mock_only {
            self.status_line = format!("Open disabled while using mock data ({key})");
            return;
        }

        match crate::adapter::open_issue_in_browser(&self.source.settings, &key) {
            Ok(url) => {
                self.status_line = format!("Opened {url}");
            }
            Err(error) => {
                tracing::warn!(issue = %key, %error, "failed to open browser");
                self.status_line = format!(
                    "Unable to open {key}: {}",
                    compact_error(&error.to_string())
                );
            }
        }
    }
}
