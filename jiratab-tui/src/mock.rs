use jiratab_domain::{parse_issue_date, Issue};

fn mock_issue(
    key: &str,
    issue_type: Option<&str>,
    summary: &str,
    status: &str,
    dates: [Option<&str>; 3],
) -> Issue {
    let [begin, testing, release] = dates.map(|date| date.and_then(parse_issue_date));
    Issue {
        key: key.to_string(),
        issue_type: issue_type.map(str::to_string),
        summary: Some(summary.to_string()),
        status: Some(status.to_string()),
        begin_date: begin,
        testing_date: testing,
        release_date: release,
    }
}

pub fn mock_issues() -> Vec<Issue> {
    vec![
        mock_issue(
            "TAB-104",
            Some("Story"),
            "Per-column filter inputs",
            "In Progress",
            [Some("2026-02-02"), Some("2026-02-16"), Some("2026-03-01")],
        ),
        mock_issue(
            "TAB-101",
            Some("Task"),
            "Render issue table on new tab",
            "Done",
            [Some("2026-01-05"), Some("2026-01-12"), Some("2026-01-20")],
        ),
        mock_issue(
            "TAB-103",
            Some("Bug"),
            "Dates render one day off near midnight",
            "Open",
            [Some("2026-01-28T23:30:00.000-0500"), None, None],
        ),
        mock_issue(
            "TAB-102",
            None,
            "Sort indicator on active header",
            "Blocked",
            [None, None, Some("2026-03-01")],
        ),
        mock_issue(
            "TAB-105",
            Some("Task"),
            "Surface tracker warnings",
            "To Do",
            [None, None, None],
        ),
    ]
}
