use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BEGIN_DATE_FIELD: &str = "customfield_28030";
pub const DEFAULT_TESTING_DATE_FIELD: &str = "customfield_11931";
pub const DEFAULT_RELEASE_DATE_FIELD: &str = "customfield_12030";

/// Jira field ids holding the three dates shown on the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateFields {
    pub begin: String,
    pub testing: String,
    pub release: String,
}

impl Default for DateFields {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN_DATE_FIELD.to_string(),
            testing: DEFAULT_TESTING_DATE_FIELD.to_string(),
            release: DEFAULT_RELEASE_DATE_FIELD.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub jql: Option<String>,
    pub insecure: bool,
    pub date_fields: DateFields,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            token: None,
            jql: None,
            insecure: false,
            date_fields: DateFields::default(),
        }
    }
}

#[derive(Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    general: RawGeneral,
    enabled: Option<bool>,
    jira_server: Option<String>,
    base_url: Option<String>,
    jira_token: Option<String>,
    jql: Option<String>,
    insecure: Option<bool>,
    date_fields: Option<RawDateFields>,
}

#[derive(Default, Deserialize)]
struct RawGeneral {
    enabled: Option<bool>,
    jira_server: Option<String>,
    base_url: Option<String>,
    jira_token: Option<String>,
    jql: Option<String>,
    insecure: Option<bool>,
    date_fields: Option<RawDateFields>,
}

#[derive(Default, Deserialize)]
struct RawDateFields {
    begin: Option<String>,
    testing: Option<String>,
    release: Option<String>,
}

impl Settings {
    /// Reads settings from `path`. A missing file is not an error: it yields
    /// unconfigured defaults so callers land on the "not configured" path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let payload = match fs::read_to_string(path) {
            Ok(payload) => payload,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read config at {}", path.display()))
            }
        };
        Self::from_yaml(&payload)
    }

    pub fn from_yaml(payload: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        if payload.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawSettings =
            serde_yaml::from_str(payload).with_context(|| "invalid YAML config format")?;
        Ok(Self::from_raw(raw))
    }

    /// Names of the settings a fetch needs but that are not set.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.is_none() {
            missing.push("jira_server");
        }
        if self.token.is_none() {
            missing.push("jira_token");
        }
        if self.jql.is_none() {
            missing.push("jql");
        }
        missing
    }

    pub fn issue_url(&self, key: &str) -> Option<String> {
        let server = self.base_url.as_deref()?;
        Some(format!("{server}/browse/{key}"))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let general = raw.general;
        let enabled = general.enabled.or(raw.enabled).unwrap_or(true);
        let base_url = first_some(general.jira_server, general.base_url)
            .or(raw.jira_server)
            .or(raw.base_url)
            .and_then(normalize_base_url);
        let token = first_some(general.jira_token, raw.jira_token).and_then(resolve_token);
        let jql = first_some(general.jql, raw.jql).and_then(non_empty);
        let insecure = general.insecure.or(raw.insecure).unwrap_or(false);
        let date_fields = first_some(general.date_fields, raw.date_fields)
            .map(parse_date_fields)
            .unwrap_or_default();

        Self {
            enabled,
            base_url,
            token,
            jql,
            insecure,
            date_fields,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(override_path) = env::var_os("JIRATAB_CONFIG_FILE") {
        return PathBuf::from(override_path);
    }

    let mut base = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.push(".config");
    base.push("jiratab");
    base.push("config.yaml");
    base
}

fn parse_date_fields(raw: RawDateFields) -> DateFields {
    let defaults = DateFields::default();
    DateFields {
        begin: raw.begin.and_then(non_empty).unwrap_or(defaults.begin),
        testing: raw.testing.and_then(non_empty).unwrap_or(defaults.testing),
        release: raw.release.and_then(non_empty).unwrap_or(defaults.release),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn normalize_base_url(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.trim_end_matches('/').to_string())
    } else {
        Some(format!("https://{}", trimmed.trim_end_matches('/')))
    }
}

fn first_some<T>(first: Option<T>, second: Option<T>) -> Option<T> {
    first.or(second)
}

fn resolve_token(value: String) -> Option<String> {
    resolve_token_with(value, fetch_secret_from_manager)
}

fn resolve_token_with<F>(value: String, fetch: F) -> Option<String>
where
    F: Fn(&str, &str) -> Option<String>,
{
    let token = non_empty(value)?;
    let Some((provider, key)) = parse_secret_reference(token.as_str()) else {
        return Some(token);
    };
    let resolved = fetch(provider, key);
    if resolved.is_none() {
        tracing::warn!(provider, key, "secret lookup returned nothing");
    }
    resolved
}

fn parse_secret_reference(value: &str) -> Option<(&str, &str)> {
    let (provider, key) = value.split_once("::")?;
    if key.trim().is_empty() {
        return None;
    }
    if provider == "pass" || provider == "passage" {
        Some((provider, key.trim()))
    } else {
        None
    }
}

fn fetch_secret_from_manager(provider: &str, key: &str) -> Option<String> {
    let output = Command::new(provider).arg("show").arg(key).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    // pass prints the secret on the first line; later lines are metadata.
    stdout.lines().next().map(str::to_string).and_then(non_empty)
}
