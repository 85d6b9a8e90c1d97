use anyhow::{anyhow, Result};
use jiratab_config::Settings;
use jiratab_jira::{FetchError, QueryExecutor, QuerySpec, SearchOutcome};

pub fn load_issues_from_jira(settings: &Settings) -> Result<SearchOutcome, FetchError> {
    let spec = QuerySpec::from_settings(settings)?;
    let executor = QueryExecutor::from_settings(settings)?;
    executor.execute(&spec)
}

pub fn open_issue_in_browser(settings: &Settings, key: &str) -> Result<String> {
    let url = settings
        .issue_url(key)
        .ok_or_else(|| anyhow!("jira_server not configured"))?;
    webbrowser::open(&url)?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use jiratab_config::Settings;
    use jiratab_jira::FetchError;

    use super::{load_issues_from_jira, open_issue_in_browser};

    #[test]
    fn reports_missing_settings_before_any_request() {
        let settings = Settings {
            base_url: Some("https://jira.example.com".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            load_issues_from_jira(&settings),
            Err(FetchError::NotConfigured("jira_token, jql".to_string()))
        );
    }

    #[test]
    fn empty_query_never_reaches_the_network() {
        let settings = Settings {
            base_url: Some("https://jira.invalid".to_string()),
            token: Some("token".to_string()),
            jql: Some(" ".to_string()),
            ..Settings::default()
        };
        assert_eq!(load_issues_from_jira(&settings), Err(FetchError::EmptyQuery));
    }

    #[test]
    fn open_requires_a_server() {
        let error = open_issue_in_browser(&Settings::default(), "TAB-1").expect_err("error");
        assert!(error.to_string().contains("jira_server"));
    }
}
