use std::path::PathBuf;

use clap::Parser;
use smarttrace_core::ConfigOverrides;

/// Browse multi-camera re-identification results in the terminal.
#[derive(Parser, Debug, Default, Clone)]
#[command(version)]
pub struct Cli {
    /// Base URL of the retrieval service; overrides `server_url` in config.toml.
    #[arg(long = "server-url", value_name = "URL", global = true)]
    pub server_url: Option<String>,

    /// File that mirrors the last result list so the next run can restore it.
    #[arg(long = "session-file", value_name = "FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Media player launched with each clip URL, e.g. `--player mpv`.
    /// Use `player` in config.toml to pass extra arguments.
    #[arg(long, value_name = "PROGRAM", global = true)]
    pub player: Option<String>,
}

impl Cli {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_url: self.server_url.clone(),
            session_file: self.session_file.clone(),
            player: self.player.clone().map(|program| vec![program]),
        }
    }
}
