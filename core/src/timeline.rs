use std::collections::BTreeSet;

use smarttrace_protocol::Ident;
use smarttrace_protocol::TrackNode;

/// One marker per distinct camera, spread across `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineMarker {
    pub camera: Ident,
    /// Normalized horizontal position.
    pub position: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    markers: Vec<TimelineMarker>,
}

impl Timeline {
    /// Cameras come from the node list, the same source as the statistics
    /// table, never from the track-level `cameras` field.
    pub fn from_nodes(nodes: &[TrackNode]) -> Self {
        let cameras: BTreeSet<&Ident> = nodes.iter().map(|node| &node.camera_id).collect();
        let count = cameras.len();
        let markers = cameras
            .into_iter()
            .enumerate()
            .map(|(index, camera)| TimelineMarker {
                camera: camera.clone(),
                position: if count == 1 {
                    0.5
                } else {
                    index as f64 / (count - 1) as f64
                },
            })
            .collect();
        Self { markers }
    }

    pub fn markers(&self) -> &[TimelineMarker] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// First node recorded by the marker's camera.
    pub fn target<'a>(&self, marker_index: usize, nodes: &'a [TrackNode]) -> Option<&'a TrackNode> {
        let marker = self.markers.get(marker_index)?;
        nodes.iter().find(|node| node.camera_id == marker.camera)
    }
}

/// Column of a normalized position on an axis `width` cells wide.
pub fn axis_column(position: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let last = f64::from(width - 1);
    (position.clamp(0.0, 1.0) * last).round() as u16
}
