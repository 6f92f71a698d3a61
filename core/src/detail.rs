//! Hand-off of the selected result to the detail view, and the detail view
//! state built from it.

use smarttrace_protocol::Track;
use smarttrace_protocol::TrackNode;

use crate::error::DetailError;
use crate::filter::CascadingFilter;
use crate::grid::GridModel;
use crate::grid::format_score;
use crate::grid::node_grid;
use crate::statistics::TrackStatistics;
use crate::statistics::format_node_count;
use crate::timeline::Timeline;

/// Single-slot store for the track chosen on the result grid.
///
/// Every selection overwrites the slot; opening the detail view consumes it.
#[derive(Debug, Default)]
pub struct DetailHandoff {
    slot: Option<Track>,
}

impl DetailHandoff {
    pub fn select(&mut self, track: Track) {
        tracing::debug!(global_id = %track.global_id, "selected track for detail view");
        self.slot = Some(track);
    }

    pub fn take(&mut self) -> Result<Track, DetailError> {
        self.slot.take().ok_or(DetailError::MissingSelection)
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}

/// Header summary: identifier, confidence and sighting count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailHeader {
    pub global_id: String,
    pub confidence: String,
    pub node_count: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DetailView {
    track: Track,
    statistics: TrackStatistics,
    filter: CascadingFilter,
    timeline: Timeline,
    fallback_thumbnail: String,
}

impl DetailView {
    /// Consumes the pending selection. Fails with
    /// [`DetailError::MissingSelection`] when nothing was handed over, in
    /// which case the caller returns to the search view.
    pub fn open(
        handoff: &mut DetailHandoff,
        fallback_thumbnail: impl Into<String>,
    ) -> Result<Self, DetailError> {
        let track = handoff.take()?;
        Ok(Self::new(track, fallback_thumbnail))
    }

    pub fn new(track: Track, fallback_thumbnail: impl Into<String>) -> Self {
        let statistics = TrackStatistics::from_nodes(&track.nodes);
        let filter = CascadingFilter::new(track.nodes.clone());
        let timeline = Timeline::from_nodes(&track.nodes);
        Self {
            track,
            statistics,
            filter,
            timeline,
            fallback_thumbnail: fallback_thumbnail.into(),
        }
    }

    pub fn header(&self) -> DetailHeader {
        DetailHeader {
            global_id: self.track.global_id.to_string(),
            confidence: format_score(self.track.score),
            node_count: format_node_count(self.track.nodes.len()),
            thumbnail: self.track.thumbnail().map(str::to_string),
        }
    }

    pub fn grid(&self) -> GridModel {
        node_grid(&self.track, &self.filter.filtered(), &self.fallback_thumbnail)
    }

    /// Node behind a card of [`grid`](Self::grid).
    pub fn node_for_card(&self, node_index: usize) -> Option<&TrackNode> {
        self.filter.filtered().get(node_index).copied()
    }

    /// Node a timeline marker plays.
    pub fn node_for_marker(&self, marker_index: usize) -> Option<&TrackNode> {
        self.timeline.target(marker_index, &self.track.nodes)
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn statistics(&self) -> &TrackStatistics {
        &self.statistics
    }

    pub fn filter(&self) -> &CascadingFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut CascadingFilter {
        &mut self.filter
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn fallback_thumbnail(&self) -> &str {
        &self.fallback_thumbnail
    }
}
