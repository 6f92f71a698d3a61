//! One-shot commands of the `smarttrace` binary. The interactive browser
//! lives in `smarttrace-tui`; these cover scripting and quick lookups.

use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use smarttrace_core::Config;
use smarttrace_core::ConfigOverrides;
use smarttrace_core::ResultCache;
use smarttrace_core::find_smarttrace_home;
use tracing_subscriber::EnvFilter;

pub mod search_cmd;
pub mod session_cmd;

/// Session file used by one-shot commands when none is configured, so that
/// `show` and `play` can read what `search` stored.
pub const DEFAULT_SESSION_FILE: &str = "last_search.json";

/// Loaded configuration plus the cache the one-shot commands share.
pub struct CommandContext {
    pub config: Config,
    pub session_file: PathBuf,
}

impl CommandContext {
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let home = find_smarttrace_home()?;
        let config = Config::load_with_overrides(&home, overrides)
            .context("failed to load configuration")?;
        let session_file = config
            .session_file
            .clone()
            .unwrap_or_else(|| home.join(DEFAULT_SESSION_FILE));
        Ok(Self {
            config,
            session_file,
        })
    }

    pub fn cache(&self) -> ResultCache {
        ResultCache::with_session_file(self.session_file.clone())
    }
}

/// Diagnostics go to stderr so stdout stays parseable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
