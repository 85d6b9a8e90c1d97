//! Issue model and the derived dashboard view: column accessors, the
//! filter/sort store and the row projector.

pub mod column;
pub mod issue;
pub mod store;
pub mod view;

pub use column::{Column, COLUMN_COUNT};
pub use issue::{format_issue_date, parse_issue_date, Issue};
pub use store::{FilterSpec, IssueStore, SortDirection, SortSpec, ViewListener};
pub use view::{project, RowCache, RowRecord};
