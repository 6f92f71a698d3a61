use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::ConfigError;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const HOME_ENV_VAR: &str = "SMARTTRACE_HOME";
pub const DEFAULT_FALLBACK_THUMBNAIL: &str = "static/assets/SmartTraceRetrieval.png";

/// Client configuration, read from `$SMARTTRACE_HOME/config.toml`.
///
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the retrieval service.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Upper bound for a single search or video request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Asset shown when a card has no thumbnail or it fails to load.
    #[serde(default = "default_fallback_thumbnail")]
    pub fallback_thumbnail: String,

    /// Media player command line; the clip URL is appended as the last argument.
    #[serde(default)]
    pub player: Option<Vec<String>>,

    /// Mirror the result cache into this file so later runs of the same
    /// session can restore it.
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fallback_thumbnail() -> String {
    DEFAULT_FALLBACK_THUMBNAIL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
            fallback_thumbnail: default_fallback_thumbnail(),
            player: None,
            session_file: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load `config.toml` from `home`, falling back to defaults when the file
    /// does not exist.
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILENAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.server_url).map_err(|source| ConfigError::ServerUrl {
            value: self.server_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_dir(&self, home: &Path) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| home.join("log"))
    }
}

/// Command-line values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub player: Option<Vec<String>>,
}

impl Config {
    pub fn load_with_overrides(
        home: &Path,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load(home)?;
        if let Some(server_url) = overrides.server_url {
            config.server_url = server_url;
        }
        if let Some(session_file) = overrides.session_file {
            config.session_file = Some(session_file);
        }
        if let Some(player) = overrides.player {
            config.player = Some(player);
        }
        config.validate()?;
        Ok(config)
    }
}

/// `$SMARTTRACE_HOME`, else `~/.smarttrace`.
pub fn find_smarttrace_home() -> Result<PathBuf, ConfigError> {
    if let Some(value) = std::env::var_os(HOME_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(PathBuf::from(value));
    }
    let mut home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    home.push(".smarttrace");
    Ok(home)
}
