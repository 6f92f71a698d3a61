use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::Ident;

/// One candidate identity returned by `/api/search`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub global_id: Ident,

    /// Relevance in `[0, 1]`.
    #[serde(default)]
    pub score: f64,

    #[serde(rename = "thum_url", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Cameras reported by the backend for the whole track. May repeat ids.
    #[serde(default)]
    pub cameras: Vec<Ident>,

    /// Camera sightings, in backend order.
    #[serde(rename = "tracks", default)]
    pub nodes: Vec<TrackNode>,

    /// Fields this client does not interpret (e.g. `detail_url`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One camera sighting belonging to a [`Track`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackNode {
    #[serde(rename = "seq_id")]
    pub sequence_id: Ident,

    #[serde(rename = "cam_id")]
    pub camera_id: Ident,

    #[serde(rename = "obj_id")]
    pub object_id: Ident,

    #[serde(rename = "thum_url", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Opaque per-sighting payload such as `detections`. The video endpoint
    /// reads it back from the node list we send, so it must survive untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    /// Thumbnail location, treating an empty string as absent.
    pub fn thumbnail(&self) -> Option<&str> {
        non_empty(self.thumbnail_url.as_deref())
    }

    /// Track-level camera list with duplicates removed, ascending.
    pub fn distinct_cameras(&self) -> Vec<Ident> {
        let mut cameras = self.cameras.clone();
        cameras.sort();
        cameras.dedup();
        cameras
    }
}

impl TrackNode {
    pub fn new(
        sequence_id: impl Into<Ident>,
        camera_id: impl Into<Ident>,
        object_id: impl Into<Ident>,
    ) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            camera_id: camera_id.into(),
            object_id: object_id.into(),
            thumbnail_url: None,
            extra: Map::new(),
        }
    }

    /// The node's own thumbnail, else the parent track's.
    pub fn thumbnail_or<'a>(&'a self, parent: &'a Track) -> Option<&'a str> {
        non_empty(self.thumbnail_url.as_deref()).or_else(|| parent.thumbnail())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
