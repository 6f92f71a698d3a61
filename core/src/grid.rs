//! Card models for the result grid and the per-track node grid.
//!
//! Both grids produce the same [`Card`] shape so one widget can draw them.

use smarttrace_protocol::Ident;
use smarttrace_protocol::Track;
use smarttrace_protocol::TrackNode;

pub const NO_MATCHES_PLACEHOLDER: &str = "No Matches Found";
pub const NO_FILTERED_NODES_PLACEHOLDER: &str = "No videos match the selected filters.";
pub const RECORDING_BADGE: &str = "● REC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Remote(String),
    Fallback(String),
}

impl Thumbnail {
    fn pick(location: Option<&str>, fallback: &str) -> Self {
        match location {
            Some(location) => Thumbnail::Remote(location.to_string()),
            None => Thumbnail::Fallback(fallback.to_string()),
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Thumbnail::Remote(location) | Thumbnail::Fallback(location) => location,
        }
    }
}

/// What activating a card does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    /// Hand the result at this index to the detail view.
    OpenDetail { result_index: usize },
    /// Open a video session for the node at this index of the rendered list.
    PlayNode { node_index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub badge: String,
    pub thumbnail: Thumbnail,
    pub subtitle: String,
    pub action: CardAction,
}

impl Card {
    /// Swap in the fallback asset after the thumbnail failed to load.
    pub fn mark_thumbnail_failed(&mut self, fallback: &str) {
        self.thumbnail = Thumbnail::Fallback(fallback.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridModel {
    pub heading: Option<String>,
    pub cards: Vec<Card>,
    /// Shown instead of an empty area when there are no cards.
    pub placeholder: Option<String>,
}

pub fn result_grid(results: &[Track], fallback_thumbnail: &str) -> GridModel {
    let heading = Some(format!("Found {} Matches", results.len()));
    if results.is_empty() {
        return GridModel {
            heading,
            cards: Vec::new(),
            placeholder: Some(NO_MATCHES_PLACEHOLDER.to_string()),
        };
    }
    let cards = results
        .iter()
        .enumerate()
        .map(|(result_index, track)| Card {
            title: format!("ID: {}", track.global_id),
            badge: format_score(track.score),
            thumbnail: Thumbnail::pick(track.thumbnail(), fallback_thumbnail),
            subtitle: format!("Cams: {}", join_ids(&track.distinct_cameras())),
            action: CardAction::OpenDetail { result_index },
        })
        .collect();
    GridModel {
        heading,
        cards,
        placeholder: None,
    }
}

pub fn node_grid(track: &Track, nodes: &[&TrackNode], fallback_thumbnail: &str) -> GridModel {
    if nodes.is_empty() {
        return GridModel {
            heading: None,
            cards: Vec::new(),
            placeholder: Some(NO_FILTERED_NODES_PLACEHOLDER.to_string()),
        };
    }
    let cards = nodes
        .iter()
        .enumerate()
        .map(|(node_index, node)| Card {
            title: format!("CAM-{}", node.camera_id),
            badge: RECORDING_BADGE.to_string(),
            thumbnail: Thumbnail::pick(node.thumbnail_or(track), fallback_thumbnail),
            subtitle: format!("SEQ-{} | OBJ-{}", node.sequence_id, node.object_id),
            action: CardAction::PlayNode { node_index },
        })
        .collect();
    GridModel {
        heading: None,
        cards,
        placeholder: None,
    }
}

/// Relevance as a percentage with one decimal, e.g. `0.91` → `91.0%`.
pub fn format_score(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

fn join_ids(ids: &[Ident]) -> String {
    ids.iter().map(Ident::as_str).collect::<Vec<_>>().join(", ")
}
