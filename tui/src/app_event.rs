use smarttrace_core::Attachment;
use smarttrace_core::RequestToken;
use smarttrace_core::error::ServiceError;
use smarttrace_core::protocol::Track;
use smarttrace_core::protocol::VideoResponse;

#[derive(Debug)]
pub(crate) enum AppEvent {
    /// Outcome of the search started by the last accepted submission.
    SearchFinished(Result<Vec<Track>, ServiceError>),

    /// A picked query image was read (or failed to read) from disk.
    AttachmentLoaded(Result<Attachment, ServiceError>),

    /// Response to a clip request. The token tells the controller whether it
    /// still belongs to the open session.
    VideoResolved {
        token: RequestToken,
        outcome: Result<VideoResponse, ServiceError>,
    },

    /// A thumbnail location did not load; cards showing it switch to the
    /// fallback asset. `generation` identifies the result list it was probed for.
    ThumbnailMissing { generation: u64, location: String },
}
