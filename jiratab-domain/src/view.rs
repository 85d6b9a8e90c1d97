use crate::{
    column::{Column, COLUMN_COUNT},
    issue::Issue,
    store::{SortSpec, ViewListener},
};

/// Display projection of one issue: the seven cells in column order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowRecord {
    pub key: String,
    pub issue_type: String,
    pub summary: String,
    pub status: String,
    pub begin_date: String,
    pub testing_date: String,
    pub release_date: String,
}

impl RowRecord {
    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::Key => &self.key,
            Column::IssueType => &self.issue_type,
            Column::Summary => &self.summary,
            Column::Status => &self.status,
            Column::BeginDate => &self.begin_date,
            Column::TestingDate => &self.testing_date,
            Column::ReleaseDate => &self.release_date,
        }
    }

    pub fn cells(&self) -> [&str; COLUMN_COUNT] {
        Column::ALL.map(|column| self.cell(column))
    }
}

pub fn project(issue: &Issue) -> RowRecord {
    RowRecord {
        key: Column::Key.cell_text(issue),
        issue_type: Column::IssueType.cell_text(issue),
        summary: Column::Summary.cell_text(issue),
        status: Column::Status.cell_text(issue),
        begin_date: Column::BeginDate.cell_text(issue),
        testing_date: Column::TestingDate.cell_text(issue),
        release_date: Column::ReleaseDate.cell_text(issue),
    }
}

/// Listener that keeps the projected rows and the sort of the latest view,
/// for renderers that draw from a cached snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowCache {
    rows: Vec<RowRecord>,
    sort: SortSpec,
}

impl RowCache {
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }
}

impl ViewListener for RowCache {
    fn view_changed(&mut self, visible: &[&Issue], sort: SortSpec) {
        self.rows = visible.iter().map(|issue| project(issue)).collect();
        self.sort = sort;
    }
}
