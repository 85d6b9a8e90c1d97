mod adapter;
mod app;
mod cli_args;
mod logging;
mod mock;
mod theme;
mod tui;
mod types;
mod utils;
mod worker;

use std::io;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use jiratab_config::{default_config_path, Settings};
use jiratab_jira::QuerySpec;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{app::App, cli_args::Cli, logging::init_logging, tui::run_app, types::DashboardSource};

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref(), &cli.log_level)?;

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut settings = Settings::load_from_path(&config_path)?;
    if let Some(query) = cli.query {
        settings.jql = Some(query);
    }

    if !cli.mock {
        if !settings.enabled {
            println!(
                "jiratab is disabled (enabled: false in {})",
                config_path.display()
            );
            return Ok(());
        }
        if let Err(error) = QuerySpec::from_settings(&settings) {
            tracing::warn!(%error, "settings incomplete");
            bail!("{error}; set them in {}", config_path.display());
        }
    }

    let source = DashboardSource {
        settings,
        mock_only: cli.mock,
    };
    tracing::info!(source = %source.describe(), "starting dashboard");

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, App::new(source));
    let restore_result = restore_terminal(&mut terminal);

    restore_result?;
    run_result
}
