use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// One row of the search result. Never mutated after a fetch; a new fetch
/// replaces the whole list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub issue_type: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub begin_date: Option<DateTime<Utc>>,
    pub testing_date: Option<DateTime<Utc>>,
    pub release_date: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            issue_type: None,
            summary: None,
            status: None,
            begin_date: None,
            testing_date: None,
            release_date: None,
        }
    }
}

/// Parses the date shapes Jira emits for date and datetime fields:
/// `2024-03-15`, `2024-03-15T10:20:30.000+0000` and RFC 3339.
pub fn parse_issue_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

pub fn format_issue_date(value: Option<&DateTime<Utc>>) -> String {
    match value {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "N/A".to_string(),
    }
}
