use std::{fs::OpenOptions, path::Path};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. The terminal belongs to the dashboard, so
/// events only go to `log_file`; without one nothing is recorded.
pub fn init_logging(log_file: Option<&Path>, filter: &str) -> Result<Option<WorkerGuard>> {
    let Some(path) = log_file else {
        return Ok(None);
    };

    let filter = parse_filter(filter)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(Some(guard))
}

fn parse_filter(value: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(value.trim()).with_context(|| format!("invalid log filter '{value}'"))
}
