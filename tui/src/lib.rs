//! Terminal front end of the SmartTrace retrieval browser.

use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;
use smarttrace_core::Config;
use smarttrace_core::HttpBackend;
use smarttrace_core::find_smarttrace_home;
use tokio::sync::mpsc::unbounded_channel;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod app_event;
mod app_event_sender;
mod card_grid;
mod cli;
mod detail_screen;
mod hint_bar;
mod search_screen;
#[cfg(test)]
mod test_support;
mod text;
mod tui;
mod video_modal;

pub use cli::Cli;

use crate::app::App;
use crate::app_event_sender::AppEventSender;

const LOG_FILE_NAME: &str = "smarttrace-tui.log";
const DEFAULT_LOG_FILTER: &str = "smarttrace_tui=info,smarttrace_core=info";

pub async fn run_main(cli: Cli) -> Result<()> {
    let home = find_smarttrace_home()?;
    let config = Config::load_with_overrides(&home, cli.config_overrides())
        .wrap_err("failed to load configuration")?;
    let _log_guard = init_logging(&config.log_dir(&home))?;
    tracing::info!(server = %config.server_url, "starting smarttrace-tui");

    let backend = HttpBackend::from_config(&config)?;
    let (app_event_tx, app_event_rx) = unbounded_channel();
    let app = App::new(config, Arc::new(backend), AppEventSender::new(app_event_tx))?;

    let mut tui = tui::Tui::init()?;
    let outcome = app.run(&mut tui, app_event_rx).await;
    tui.restore()?;
    outcome
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("failed to create log dir {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(guard)
}
