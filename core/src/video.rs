//! Video session state for the playback modal.
//!
//! Every [`VideoSessionController::open`] hands out a fresh [`RequestToken`].
//! Only the response carrying the token of the current session may change
//! state; anything older, or anything arriving after the modal was closed,
//! is dropped. This keeps a slow response for clip A from overwriting clip B
//! when the user switches quickly.

use smarttrace_protocol::Track;
use smarttrace_protocol::TrackNode;
use smarttrace_protocol::VideoRequest;
use smarttrace_protocol::VideoResponse;
use url::Url;

use crate::client::RetrievalBackend;
use crate::client::resolve_location;
use crate::error::PlayerError;
use crate::error::ServiceError;
use crate::player::MediaPlayer;

pub const LOADING_LABEL: &str = "LOADING EVIDENCE...";
pub const FAILED_LABEL: &str = "VIDEO FAILED";
pub const NETWORK_ERROR_LABEL: &str = "NETWORK ERROR";
const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoState {
    Idle,
    Loading,
    Playing,
    Failed,
}

/// Clip metadata the backend reports next to the URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipInfo {
    pub cached: Option<bool>,
    pub start_frame: Option<i64>,
    pub end_frame: Option<i64>,
    pub fps: Option<f64>,
}

impl ClipInfo {
    fn from_response(response: &VideoResponse) -> Self {
        Self {
            cached: response.cached,
            start_frame: response.start_frame,
            end_frame: response.end_frame,
            fps: response.fps,
        }
    }

    /// Clip length in seconds when the frame range and rate are known.
    pub fn duration_secs(&self) -> Option<f64> {
        let (start, end, fps) = (self.start_frame?, self.end_frame?, self.fps?);
        (fps > 0.0 && end >= start).then(|| (end - start) as f64 / fps)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoSession {
    token: RequestToken,
    request: VideoRequest,
    state: VideoState,
    label: String,
    media_url: Option<String>,
    message: Option<String>,
    clip: Option<ClipInfo>,
}

impl VideoSession {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn request(&self) -> &VideoRequest {
        &self.request
    }

    pub fn state(&self) -> VideoState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref()
    }

    /// User-facing failure message, set only in [`VideoState::Failed`].
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clip(&self) -> Option<&ClipInfo> {
        self.clip.as_ref()
    }
}

/// Outcome of feeding a response to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied(VideoState),
    Stale,
}

pub struct VideoSessionController<P> {
    player: P,
    next_token: u64,
    session: Option<VideoSession>,
    base_url: Option<Url>,
}

impl<P: MediaPlayer> VideoSessionController<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            next_token: 0,
            session: None,
            base_url: None,
        }
    }

    /// Relative clip URLs are resolved against `base_url` before loading.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Starts a session for `node`, superseding whatever was open.
    ///
    /// The returned request must be sent to the backend and its outcome fed
    /// back through [`resolve`](Self::resolve) together with the token.
    pub fn open(&mut self, track: &Track, node: &TrackNode) -> (RequestToken, VideoRequest) {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        if let Some(previous) = &self.session {
            tracing::debug!(
                previous = previous.token.0,
                current = token.0,
                "superseding video session"
            );
        }
        self.player.stop();
        let request = VideoRequest::for_node(track, node);
        self.session = Some(VideoSession {
            token,
            request: request.clone(),
            state: VideoState::Loading,
            label: LOADING_LABEL.to_string(),
            media_url: None,
            message: None,
            clip: None,
        });
        (token, request)
    }

    pub fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<VideoResponse, ServiceError>,
    ) -> Resolution {
        let Some(session) = self.session.as_mut().filter(|s| s.token == token) else {
            tracing::debug!(token = token.0, "dropping stale video response");
            return Resolution::Stale;
        };

        match outcome {
            Ok(response) => match response.playable_url() {
                Some(location) => {
                    let url = match &self.base_url {
                        Some(base) => resolve_location(base, location),
                        None => location.to_string(),
                    };
                    session.state = VideoState::Playing;
                    session.label = format!(
                        "CAM-{} | SEQ-{}",
                        session.request.cam_id, session.request.seq_id
                    );
                    session.media_url = Some(url.clone());
                    session.clip = Some(ClipInfo::from_response(&response));
                    self.player.load(&url);
                    if let Err(err) = self.player.play() {
                        log_play_refused(&err);
                    }
                }
                None => {
                    let reason = response
                        .error
                        .filter(|error| !error.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                    fail(session, FAILED_LABEL, &reason);
                }
            },
            Err(err) if err.is_transport() => {
                tracing::warn!("video request failed: {err}");
                fail(session, NETWORK_ERROR_LABEL, &err.to_string());
            }
            Err(ServiceError::Server {
                message: Some(message),
                ..
            }) => fail(session, FAILED_LABEL, &message),
            Err(err) => {
                tracing::warn!("video request rejected: {err}");
                fail(session, FAILED_LABEL, UNKNOWN_ERROR);
            }
        }
        Resolution::Applied(session.state)
    }

    /// Retry playback of the loaded clip, e.g. on an explicit user request.
    pub fn resume(&mut self) -> Result<(), PlayerError> {
        if self.state() != VideoState::Playing {
            return Err(PlayerError::NothingLoaded);
        }
        self.player.play()
    }

    /// Closes the modal. Halts playback and clears the source; any response
    /// still in flight becomes stale.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(token = session.token.0, "closing video session");
        }
        self.player.stop();
    }

    /// Fetch and resolve in one step; the headless path.
    pub async fn play(
        &mut self,
        backend: &dyn RetrievalBackend,
        track: &Track,
        node: &TrackNode,
    ) -> Resolution {
        let (token, request) = self.open(track, node);
        let outcome = backend.fetch_video(&request).await;
        self.resolve(token, outcome)
    }

    pub fn state(&self) -> VideoState {
        self.session
            .as_ref()
            .map_or(VideoState::Idle, VideoSession::state)
    }

    pub fn session(&self) -> Option<&VideoSession> {
        self.session.as_ref()
    }

    pub fn is_modal_visible(&self) -> bool {
        self.session.is_some()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}

fn fail(session: &mut VideoSession, label: &str, reason: &str) {
    session.state = VideoState::Failed;
    session.label = label.to_string();
    session.media_url = None;
    session.message = Some(format!("Could not load video: {reason}"));
}

fn log_play_refused(err: &PlayerError) {
    match err {
        PlayerError::NotConfigured => {
            tracing::info!("clip ready; no media player configured for autoplay")
        }
        other => tracing::warn!("autoplay failed: {other}"),
    }
}
