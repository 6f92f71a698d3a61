use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use smarttrace_protocol::ErrorBody;
use smarttrace_protocol::Track;
use smarttrace_protocol::VideoRequest;
use smarttrace_protocol::VideoResponse;
use url::Url;

use crate::config::Config;
use crate::error::BackendInitError;
use crate::error::ServiceError;

const SEARCH_PATH: &str = "api/search";
const VIDEO_PATH: &str = "api/get_video";

/// Image attached to a search, read fully into memory before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub async fn from_path(path: &Path) -> Result<Self, ServiceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ServiceError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }
}

/// A text query, an image, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl SearchQuery {
    /// Builds a query with surrounding whitespace stripped from `text`.
    pub fn new(text: &str, attachment: Option<Attachment>) -> Self {
        Self {
            text: text.trim().to_string(),
            attachment,
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(text, None)
    }

    /// A query needs non-blank text or an attachment.
    pub fn is_submittable(&self) -> bool {
        !self.text.is_empty() || self.attachment.is_some()
    }
}

/// The two calls the browser makes against the retrieval service.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Track>, ServiceError>;

    async fn fetch_video(&self, request: &VideoRequest) -> Result<VideoResponse, ServiceError>;

    /// Whether a thumbnail location can be loaded. Cards whose probe fails
    /// switch to the fallback asset.
    async fn probe_thumbnail(&self, _location: &str) -> bool {
        true
    }
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ServiceError::Network {
                message: err.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendInitError> {
        let base_url = config.base_url()?;
        Ok(Self::new(base_url, config.request_timeout())?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a server-relative location (thumbnail, clip) to an absolute URL.
    pub fn resolve(&self, location: &str) -> String {
        resolve_location(&self.base_url, location)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|err| ServiceError::Network {
                message: format!("invalid endpoint {path}: {err}"),
            })
    }

    fn transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ServiceError::Network {
                message: err.to_string(),
            }
        }
    }

    async fn read_body(&self, resp: reqwest::Response) -> Result<String, ServiceError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|err| self.transport_error(err))?;
        if !status.is_success() {
            return Err(ServiceError::Server {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RetrievalBackend for HttpBackend {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Track>, ServiceError> {
        let mut form = Form::new().text("query", query.text.clone());
        if let Some(attachment) = &query.attachment {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(&attachment.mime)
                .map_err(|err| ServiceError::Network {
                    message: format!("invalid attachment type {}: {err}", attachment.mime),
                })?;
            form = form.part("file", part);
        }
        tracing::info!(
            text_len = query.text.len(),
            has_image = query.attachment.is_some(),
            "submitting search"
        );
        let resp = self
            .http
            .post(self.endpoint(SEARCH_PATH)?)
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let body = self.read_body(resp).await?;
        let results: Vec<Track> = serde_json::from_str(&body)
            .map_err(|err| ServiceError::malformed(format!("search results: {err}")))?;
        tracing::info!(count = results.len(), "search returned");
        Ok(results)
    }

    async fn fetch_video(&self, request: &VideoRequest) -> Result<VideoResponse, ServiceError> {
        tracing::info!(
            global_id = %request.global_id,
            seq_id = %request.seq_id,
            cam_id = %request.cam_id,
            obj_id = %request.obj_id,
            "requesting clip"
        );
        let resp = self
            .http
            .post(self.endpoint(VIDEO_PATH)?)
            .json(request)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let body = self.read_body(resp).await?;
        serde_json::from_str(&body)
            .map_err(|err| ServiceError::malformed(format!("video response: {err}")))
    }

    async fn probe_thumbnail(&self, location: &str) -> bool {
        let url = self.resolve(location);
        match self.http.head(&url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!(%url, status = %resp.status(), "thumbnail unavailable");
                false
            }
            Err(err) => {
                tracing::debug!(%url, "thumbnail probe failed: {err}");
                false
            }
        }
    }
}

/// `location` joined onto `base`; left untouched if it cannot be joined.
pub fn resolve_location(base: &Url, location: &str) -> String {
    match base.join(location) {
        Ok(url) => url.to_string(),
        Err(err) => {
            tracing::debug!("leaving location {location:?} unresolved: {err}");
            location.to_string()
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.filter(|message| !message.trim().is_empty())
}
