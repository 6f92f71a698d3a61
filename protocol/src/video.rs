use serde::Deserialize;
use serde::Serialize;

use crate::Ident;
use crate::Track;
use crate::TrackNode;

/// Body of `POST /api/get_video`.
///
/// `tracks` carries the full node list of the selected track; the backend
/// searches it for the matching `(seq_id, cam_id, obj_id)` sighting to find
/// the detections it cuts the clip from.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoRequest {
    pub global_id: Ident,
    pub seq_id: Ident,
    pub cam_id: Ident,
    pub obj_id: Ident,
    pub tracks: Vec<TrackNode>,
}

impl VideoRequest {
    pub fn for_node(track: &Track, node: &TrackNode) -> Self {
        Self {
            global_id: track.global_id.clone(),
            seq_id: node.sequence_id.clone(),
            cam_id: node.camera_id.clone(),
            obj_id: node.object_id.clone(),
            tracks: track.nodes.clone(),
        }
    }
}

/// Response of `POST /api/get_video`, success and failure alike.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VideoResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the clip was served from the backend's crop cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
}

impl VideoResponse {
    pub fn playable_url(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Error payload the backend attaches to non-success responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
