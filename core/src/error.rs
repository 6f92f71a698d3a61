use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the retrieval backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Non-success status. `message` is the backend's `error` field, if any.
    #[error("server returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server { status: u16, message: Option<String> },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("failed to read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Message meant for the user; prefers what the backend said.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Transport-level failures, as opposed to the backend answering badly.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// Empty query and no attachment. The trigger should have been disabled.
    #[error("enter a text query or attach an image")]
    InputInvalid,

    #[error("a search is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("camera filter is disabled until a sequence is selected")]
    CameraDisabled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailError {
    #[error("no track selected")]
    MissingSelection,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no media player configured")]
    NotConfigured,

    #[error("no media loaded")]
    NothingLoaded,

    #[error("failed to launch media player `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for media player: {0}")]
    Wait(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid server_url `{value}`: {source}")]
    ServerUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("could not determine a home directory for smarttrace")]
    NoHome,
}

/// Building an [`HttpBackend`](crate::client::HttpBackend) from config.
#[derive(Debug, Error)]
pub enum BackendInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
