use std::{cmp::Ordering, collections::BTreeMap};

use crate::{column::Column, issue::Issue};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: Column::Key,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortSpec {
    /// Same column flips the direction; another column starts ascending.
    pub fn toggle(&mut self, column: Column) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn compare(&self, left: &Issue, right: &Issue) -> Ordering {
        let ordering = self.column.sort_key(left).cmp(&self.column.sort_key(right));
        self.direction.apply(ordering)
    }
}

/// Per-column substring patterns. Every pattern present must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    patterns: BTreeMap<Column, String>,
}

impl FilterSpec {
    /// Sets the pattern for `column`; an empty pattern removes the constraint.
    pub fn set(&mut self, column: Column, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if pattern.is_empty() {
            self.patterns.remove(&column);
        } else {
            self.patterns.insert(column, pattern);
        }
    }

    pub fn pattern(&self, column: Column) -> Option<&str> {
        self.patterns.get(&column).map(String::as_str)
    }

    /// Indices into `issues` that pass every pattern, in source order.
    pub fn apply(&self, issues: &[Issue]) -> Vec<usize> {
        let lowered = self
            .patterns
            .iter()
            .map(|(column, pattern)| (*column, pattern.to_lowercase()))
            .collect::<Vec<_>>();

        issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| {
                lowered
                    .iter()
                    .all(|(column, pattern)| cell_contains(*column, issue, pattern))
            })
            .map(|(index, _)| index)
            .collect()
    }
}

fn cell_contains(column: Column, issue: &Issue, lowered_pattern: &str) -> bool {
    column
        .cell_text(issue)
        .to_lowercase()
        .contains(lowered_pattern)
}

/// Receives the derived view after every store mutation.
pub trait ViewListener {
    fn view_changed(&mut self, visible: &[&Issue], sort: SortSpec);
}

impl ViewListener for () {
    fn view_changed(&mut self, _visible: &[&Issue], _sort: SortSpec) {}
}

/// Owns the fetched issues plus the active filter and sort, and keeps the
/// derived view (`sort(filter(source))`) in sync on every mutation.
#[derive(Debug)]
pub struct IssueStore<L = ()> {
    source: Vec<Issue>,
    filter: FilterSpec,
    sort: SortSpec,
    visible: Vec<usize>,
    listener: L,
}

impl Default for IssueStore<()> {
    fn default() -> Self {
        Self::new(())
    }
}

impl<L: ViewListener> IssueStore<L> {
    pub fn new(listener: L) -> Self {
        Self {
            source: Vec::new(),
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            visible: Vec::new(),
            listener,
        }
    }

    /// Replaces the whole result set. The filter carries over; the sort goes
    /// back to key ascending.
    pub fn set_source(&mut self, issues: Vec<Issue>) {
        self.source = issues;
        self.sort = SortSpec::default();
        self.refilter();
        self.notify();
    }

    pub fn set_filter(&mut self, column: Column, pattern: impl Into<String>) {
        self.filter.set(column, pattern);
        self.refilter();
        self.notify();
    }

    pub fn toggle_sort(&mut self, column: Column) {
        self.sort.toggle(column);
        self.resort();
        self.notify();
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Issue> + '_ {
        self.visible.iter().map(|index| &self.source[*index])
    }

    pub fn visible_issue(&self, position: usize) -> Option<&Issue> {
        self.visible
            .get(position)
            .and_then(|index| self.source.get(*index))
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    fn refilter(&mut self) {
        self.visible = self.filter.apply(&self.source);
        self.resort();
    }

    fn resort(&mut self) {
        let source = &self.source;
        let sort = self.sort;
        self.visible
            .sort_by(|left, right| sort.compare(&source[*left], &source[*right]));
        tracing::debug!(
            total = self.source.len(),
            visible = self.visible.len(),
            column = %sort.column,
            direction = ?sort.direction,
            "view recomputed"
        );
    }

    fn notify(&mut self) {
        let visible = self
            .visible
            .iter()
            .map(|index| &self.source[*index])
            .collect::<Vec<_>>();
        self.listener.view_changed(&visible, self.sort);
    }
}
