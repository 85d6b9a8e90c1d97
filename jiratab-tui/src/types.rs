use jiratab_config::Settings;

/// Where the dashboard gets its issues from for this session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardSource {
    pub settings: Settings,
    pub mock_only: bool,
}

impl DashboardSource {
    pub fn describe(&self) -> String {
        if self.mock_only {
            return "mock-only".to_string();
        }

        match self.settings.jql.as_deref() {
            Some(jql) => format!("jql={jql}"),
            None => "jql=<unset>".to_string(),
        }
    }
}
