use std::{
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use jiratab_config::{DateFields, Settings};
use jiratab_domain::{parse_issue_date, Issue};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const SEARCH_PATH: &str = "rest/api/2/search";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("JQL query is empty")]
    EmptyQuery,
    #[error("Jira is not configured (missing {0})")]
    NotConfigured(String),
    #[error("HTTP error! status: {0}")]
    Http(u16),
    #[error("{0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected search response: {0}")]
    Decode(String),
}

/// Parameters for one search. Built from settings right before a fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub base_url: String,
    pub token: String,
    pub jql: String,
}

impl QuerySpec {
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        match (&settings.base_url, &settings.token, &settings.jql) {
            (Some(base_url), Some(token), Some(jql)) => Ok(Self {
                base_url: base_url.clone(),
                token: token.clone(),
                jql: jql.clone(),
            }),
            _ => Err(FetchError::NotConfigured(
                settings.missing_fields().join(", "),
            )),
        }
    }
}

impl fmt::Debug for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("jql", &self.jql)
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub issues: Vec<Issue>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network boundary: one authenticated GET returning status and body.
pub trait SearchTransport {
    fn get(&self, url: &str, token: &str) -> Result<TransportResponse, FetchError>;
}

/// Blocking reqwest transport. No request timeout is set: a hung call stays
/// pending until the server or the OS gives up.
pub struct JiraTransport {
    http: Client,
}

impl JiraTransport {
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(settings.insecure)
            .timeout(None::<Duration>)
            .build()
            .map_err(|error| {
                FetchError::Transport(format!("failed to build Jira HTTP client: {error}"))
            })?;
        Ok(Self { http })
    }
}

impl SearchTransport for JiraTransport {
    fn get(&self, url: &str, token: &str) -> Result<TransportResponse, FetchError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .map_err(|error| FetchError::Transport(error.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| FetchError::Transport(error.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}

pub struct QueryExecutor<T> {
    transport: T,
    date_fields: DateFields,
}

#[derive(Deserialize)]
struct SearchPayload {
    #[serde(default)]
    issues: Vec<IssuePayload>,
    #[serde(rename = "errorMessages", default)]
    error_messages: Vec<String>,
    #[serde(rename = "warningMessages", default)]
    warning_messages: Vec<String>,
}

#[derive(Deserialize)]
struct IssuePayload {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Default, Deserialize)]
struct IssueFields {
    summary: Option<String>,
    status: Option<NameLike>,
    issuetype: Option<NameLike>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct NameLike {
    name: Option<String>,
}

impl QueryExecutor<JiraTransport> {
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Ok(Self::new(
            JiraTransport::from_settings(settings)?,
            settings.date_fields.clone(),
        ))
    }
}

impl<T: SearchTransport> QueryExecutor<T> {
    pub fn new(transport: T, date_fields: DateFields) -> Self {
        Self {
            transport,
            date_fields,
        }
    }

    pub fn execute(&self, spec: &QuerySpec) -> Result<SearchOutcome, FetchError> {
        if spec.jql.trim().is_empty() {
            return Err(FetchError::EmptyQuery);
        }

        let url = search_url(&spec.base_url, &spec.jql);
        tracing::debug!(%url, "executing Jira search");
        let started = Instant::now();

        let response = self.transport.get(&url, &spec.token)?;
        if !response.is_success() {
            tracing::debug!(status = response.status, body = %response.body, "search rejected");
            return Err(FetchError::Http(response.status));
        }

        let payload: SearchPayload = serde_json::from_str(&response.body)
            .map_err(|error| FetchError::Decode(error.to_string()))?;

        if !payload.error_messages.is_empty() {
            return Err(FetchError::Api(payload.error_messages.join(", ")));
        }
        if !payload.warning_messages.is_empty() {
            tracing::warn!(warnings = ?payload.warning_messages, "Jira returned warnings");
        }

        let issues = payload
            .issues
            .into_iter()
            .map(|issue| self.normalize_issue(issue))
            .collect::<Vec<_>>();
        tracing::info!(
            count = issues.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Jira search finished"
        );

        Ok(SearchOutcome {
            issues,
            warnings: payload.warning_messages,
        })
    }

    fn normalize_issue(&self, payload: IssuePayload) -> Issue {
        let mut fields = payload.fields;
        let begin_date = take_date(&mut fields.extra, &self.date_fields.begin, &payload.key);
        let testing_date = take_date(&mut fields.extra, &self.date_fields.testing, &payload.key);
        let release_date = take_date(&mut fields.extra, &self.date_fields.release, &payload.key);

        Issue {
            key: payload.key,
            issue_type: fields.issuetype.and_then(name_like),
            summary: fields.summary.and_then(non_empty),
            status: fields.status.and_then(name_like),
            begin_date,
            testing_date,
            release_date,
        }
    }
}

/// `<base>/rest/api/2/search?jql=<query>` with the query encoded token by
/// token (see [`encode_jql`]).
pub fn search_url(base_url: &str, jql: &str) -> String {
    format!(
        "{}/{}?jql={}",
        base_url.trim_end_matches('/'),
        SEARCH_PATH,
        encode_jql(jql)
    )
}

/// Percent-encodes each whitespace-separated token on its own and joins the
/// tokens with `%20`. Every whitespace character is a separator, so runs of
/// spaces inside quoted phrases keep their width.
pub fn encode_jql(jql: &str) -> String {
    jql.split(char::is_whitespace)
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("%20")
}

// Same unreserved set as JavaScript's encodeURIComponent.
fn encode_component(value: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(value.len() + 8);
    for &byte in value.as_bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(byte >> 4) as usize]));
                out.push(char::from(HEX[(byte & 0x0F) as usize]));
            }
        }
    }
    out
}

fn take_date(
    extra: &mut HashMap<String, Value>,
    field: &str,
    key: &str,
) -> Option<DateTime<Utc>> {
    let raw = match extra.remove(field)? {
        Value::String(raw) => raw,
        Value::Null => return None,
        other => {
            tracing::warn!(issue = key, field, value = %other, "date field is not a string");
            return None;
        }
    };
    let parsed = parse_issue_date(&raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::warn!(issue = key, field, value = %raw, "unparseable date");
    }
    parsed
}

fn name_like(value: NameLike) -> Option<String> {
    value.name.and_then(non_empty)
}

// Blank text counts as missing; anything else is kept exactly as sent.
fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{TimeZone, Utc};
    use jiratab_config::{DateFields, Settings};
    use serde_json::json;

    use super::{
        encode_jql, search_url, FetchError, QueryExecutor, QuerySpec, SearchTransport,
        TransportResponse,
    };

    struct FakeTransport {
        status: u16,
        body: String,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: serde_json::Value) -> Self {
            Self {
                status,
                body: body.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SearchTransport for FakeTransport {
        fn get(&self, url: &str, token: &str) -> Result<TransportResponse, FetchError> {
            self.calls
                .borrow_mut()
                .push((url.to_string(), token.to_string()));
            Ok(TransportResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    struct FailingTransport;

    impl SearchTransport for FailingTransport {
        fn get(&self, _url: &str, _token: &str) -> Result<TransportResponse, FetchError> {
            Err(FetchError::Transport("connection refused".to_string()))
        }
    }

    fn spec(jql: &str) -> QuerySpec {
        QuerySpec {
            base_url: "https://jira.example.com".to_string(),
            token: "secret".to_string(),
            jql: jql.to_string(),
        }
    }

    fn executor(transport: FakeTransport) -> QueryExecutor<FakeTransport> {
        QueryExecutor::new(transport, DateFields::default())
    }

    #[test]
    fn encodes_each_token_separately() {
        assert_eq!(
            encode_jql(r#"project = DEMO AND status in ("In Progress")"#),
            "project%20%3D%20DEMO%20AND%20status%20in%20(%22In%20Progress%22)"
        );
        assert_eq!(encode_jql("summary ~ 'café'"), "summary%20~%20'caf%C3%A9'");
        assert_eq!(encode_jql("a\tb"), "a%20b");
    }

    #[test]
    fn keeps_repeated_spaces_inside_quoted_phrases() {
        assert_eq!(
            encode_jql(r#"summary ~ "a  b""#),
            "summary%20~%20%22a%20%20b%22"
        );
    }

    #[test]
    fn builds_search_url_against_api_v2() {
        assert_eq!(
            search_url("https://jira.example.com/", "key = A-1"),
            "https://jira.example.com/rest/api/2/search?jql=key%20%3D%20A-1"
        );
    }

    #[test]
    fn empty_query_fails_without_network_call() {
        let executor = executor(FakeTransport::new(200, json!({"issues": []})));

        assert_eq!(executor.execute(&spec("")), Err(FetchError::EmptyQuery));
        assert_eq!(executor.execute(&spec("   ")), Err(FetchError::EmptyQuery));
        assert!(executor.transport.calls.borrow().is_empty());
    }

    #[test]
    fn sends_encoded_url_and_token() {
        let executor = executor(FakeTransport::new(200, json!({"issues": []})));
        executor.execute(&spec("assignee = bob")).expect("outcome");

        let calls = executor.transport.calls.borrow();
        assert_eq!(
            calls.as_slice(),
            [(
                "https://jira.example.com/rest/api/2/search?jql=assignee%20%3D%20bob".to_string(),
                "secret".to_string()
            )]
        );
    }

    #[test]
    fn non_success_status_is_http_error() {
        let executor = executor(FakeTransport::new(
            401,
            json!({"errorMessages": ["unauthorized"]}),
        ));
        assert_eq!(executor.execute(&spec("a = b")), Err(FetchError::Http(401)));
    }

    #[test]
    fn error_messages_are_joined_into_api_error() {
        let executor = executor(FakeTransport::new(
            200,
            json!({"issues": [], "errorMessages": ["bad field", "bad value"]}),
        ));
        let error = executor.execute(&spec("a = b")).expect_err("api error");
        assert_eq!(error, FetchError::Api("bad field, bad value".to_string()));
        assert_eq!(error.to_string(), "bad field, bad value");
    }

    #[test]
    fn warnings_do_not_block_the_result() {
        let executor = executor(FakeTransport::new(
            200,
            json!({
                "issues": [{"key": "DEMO-1", "fields": {"summary": "One"}}],
                "warningMessages": ["field 'foo' does not exist"]
            }),
        ));
        let outcome = executor.execute(&spec("a = b")).expect("outcome");
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.warnings, vec!["field 'foo' does not exist"]);
    }

    #[test]
    fn zero_issues_is_a_success() {
        let executor = executor(FakeTransport::new(200, json!({"total": 0})));
        let outcome = executor.execute(&spec("a = b")).expect("outcome");
        assert!(outcome.issues.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn invalid_body_is_decode_error() {
        let executor = QueryExecutor::new(
            FakeTransport {
                status: 200,
                body: "<html>login</html>".to_string(),
                calls: Default::default(),
            },
            DateFields::default(),
        );
        assert!(matches!(
            executor.execute(&spec("a = b")),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn transport_failures_pass_through() {
        let executor = QueryExecutor::new(FailingTransport, DateFields::default());
        assert_eq!(
            executor.execute(&spec("a = b")),
            Err(FetchError::Transport("connection refused".to_string()))
        );
    }

    #[test]
    fn normalizes_nested_fields_and_dates() {
        let executor = executor(FakeTransport::new(
            200,
            json!({
                "issues": [{
                    "key": "DEMO-7",
                    "fields": {
                        "summary": "  Ship it  ",
                        "status": {"name": "In Progress"},
                        "issuetype": {"name": ""},
                        "customfield_28030": "2024-03-01",
                        "customfield_11931": "2024-03-10T18:00:00.000-0800",
                        "customfield_12030": "someday"
                    }
                }]
            }),
        ));

        let issue = executor
            .execute(&spec("a = b"))
            .expect("outcome")
            .issues
            .remove(0);
        assert_eq!(issue.key, "DEMO-7");
        assert_eq!(issue.summary.as_deref(), Some("  Ship it  "));
        assert_eq!(issue.status.as_deref(), Some("In Progress"));
        assert_eq!(issue.issue_type, None);
        assert_eq!(
            issue.begin_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            issue.testing_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 11, 2, 0, 0).unwrap())
        );
        assert_eq!(issue.release_date, None);
    }

    #[test]
    fn honors_configured_date_fields() {
        let executor = QueryExecutor::new(
            FakeTransport::new(
                200,
                json!({"issues": [{"key": "A-1", "fields": {"duedate": "2025-12-24"}}]}),
            ),
            DateFields {
                begin: "created".to_string(),
                testing: "updated".to_string(),
                release: "duedate".to_string(),
            },
        );
        let issue = executor
            .execute(&spec("a = b"))
            .expect("outcome")
            .issues
            .remove(0);
        assert_eq!(issue.begin_date, None);
        assert_eq!(
            issue.release_date,
            Some(Utc.with_ymd_and_hms(2025, 12, 24, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn query_spec_requires_every_setting() {
        let mut settings = Settings {
            base_url: Some("https://jira.example.com".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            QuerySpec::from_settings(&settings),
            Err(FetchError::NotConfigured("jira_token, jql".to_string()))
        );

        settings.token = Some("secret".to_string());
        settings.jql = Some("project = DEMO".to_string());
        let spec = QuerySpec::from_settings(&settings).expect("spec");
        assert_eq!(spec.jql, "project = DEMO");
        assert!(!format!("{spec:?}").contains("secret"));
    }
}
