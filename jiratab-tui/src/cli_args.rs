use std::path::PathBuf;

use clap::Parser;

/// Terminal dashboard of Jira issues, sortable and filterable per column.
#[derive(Debug, Parser)]
#[command(name = "jiratab", version)]
pub struct Cli {
    /// Run this JQL instead of the configured one
    #[arg(short, long, value_name = "JQL")]
    pub query: Option<String>,

    /// Settings file (defaults to ~/.config/jiratab/config.yaml)
    #[arg(short, long, value_name = "PATH", env = "JIRATAB_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Use built-in sample issues instead of querying Jira
    #[arg(long)]
    pub mock: bool,

    /// Write logs to this file; logging is off without it
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. `info` or `jiratab_jira=debug`
    #[arg(long, value_name = "FILTER", env = "JIRATAB_LOG", default_value = "info")]
    pub log_level: String,
}
