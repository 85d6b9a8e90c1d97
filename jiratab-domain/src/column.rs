use std::fmt;

use chrono::{DateTime, Utc};

use crate::issue::{format_issue_date, Issue};

pub const COLUMN_COUNT: usize = 7;

const NOT_AVAILABLE: &str = "N/A";

/// The dashboard columns, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Key,
    IssueType,
    Summary,
    Status,
    BeginDate,
    TestingDate,
    ReleaseDate,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Key,
        Column::IssueType,
        Column::Summary,
        Column::Status,
        Column::BeginDate,
        Column::TestingDate,
        Column::ReleaseDate,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        self.accessor().id
    }

    pub fn title(self) -> &'static str {
        self.accessor().title
    }

    /// Text rendered in this column's cell. Filtering matches against this
    /// same text.
    pub fn cell_text(self, issue: &Issue) -> String {
        (self.accessor().cell)(issue)
    }

    pub(crate) fn sort_key(self, issue: &Issue) -> SortKey<'_> {
        (self.accessor().sort_key)(issue)
    }

    fn accessor(self) -> &'static ColumnAccessor {
        &COLUMNS[self.index()]
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SortKey<'a> {
    Text(&'a str),
    Date(DateTime<Utc>),
}

struct ColumnAccessor {
    id: &'static str,
    title: &'static str,
    cell: fn(&Issue) -> String,
    sort_key: for<'a> fn(&'a Issue) -> SortKey<'a>,
}

// Indexed by `Column as usize`; keep in the same order as the enum.
static COLUMNS: [ColumnAccessor; COLUMN_COUNT] = [
    ColumnAccessor {
        id: "key",
        title: "Key",
        cell: key_cell,
        sort_key: key_sort,
    },
    ColumnAccessor {
        id: "issuetype",
        title: "Type",
        cell: issue_type_cell,
        sort_key: issue_type_sort,
    },
    ColumnAccessor {
        id: "summary",
        title: "Summary",
        cell: summary_cell,
        sort_key: summary_sort,
    },
    ColumnAccessor {
        id: "status",
        title: "Status",
        cell: status_cell,
        sort_key: status_sort,
    },
    ColumnAccessor {
        id: "beginDate",
        title: "Begin",
        cell: begin_date_cell,
        sort_key: begin_date_sort,
    },
    ColumnAccessor {
        id: "testingDate",
        title: "Testing",
        cell: testing_date_cell,
        sort_key: testing_date_sort,
    },
    ColumnAccessor {
        id: "releaseDate",
        title: "Release",
        cell: release_date_cell,
        sort_key: release_date_sort,
    },
];

fn text_or_na(value: Option<&String>) -> String {
    value
        .map(String::as_str)
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn text_key(value: Option<&String>) -> SortKey<'_> {
    SortKey::Text(value.map(String::as_str).unwrap_or(""))
}

fn date_key(value: Option<&DateTime<Utc>>) -> SortKey<'static> {
    SortKey::Date(value.copied().unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
}

fn key_cell(issue: &Issue) -> String {
    issue.key.clone()
}

fn key_sort(issue: &Issue) -> SortKey<'_> {
    SortKey::Text(&issue.key)
}

fn issue_type_cell(issue: &Issue) -> String {
    text_or_na(issue.issue_type.as_ref())
}

fn issue_type_sort(issue: &Issue) -> SortKey<'_> {
    text_key(issue.issue_type.as_ref())
}

fn summary_cell(issue: &Issue) -> String {
    text_or_na(issue.summary.as_ref())
}

fn summary_sort(issue: &Issue) -> SortKey<'_> {
    text_key(issue.summary.as_ref())
}

fn status_cell(issue: &Issue) -> String {
    text_or_na(issue.status.as_ref())
}

fn status_sort(issue: &Issue) -> SortKey<'_> {
    text_key(issue.status.as_ref())
}

fn begin_date_cell(issue: &Issue) -> String {
    format_issue_date(issue.begin_date.as_ref())
}

fn begin_date_sort(issue: &Issue) -> SortKey<'_> {
    date_key(issue.begin_date.as_ref())
}

fn testing_date_cell(issue: &Issue) -> String {
    format_issue_date(issue.testing_date.as_ref())
}

fn testing_date_sort(issue: &Issue) -> SortKey<'_> {
    date_key(issue.testing_date.as_ref())
}

fn release_date_cell(issue: &Issue) -> String {
    format_issue_date(issue.release_date.as_ref())
}

fn release_date_sort(issue: &Issue) -> SortKey<'_> {
    date_key(issue.release_date.as_ref())
}
