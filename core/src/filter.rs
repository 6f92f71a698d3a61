//! Two-level sequence → camera filter for the detail view.
//!
//! The camera level only exists inside a chosen sequence: while the sequence
//! selection is [`Selection::All`] the camera selection is pinned to
//! [`Selection::All`] and its option set is empty. Every sequence change
//! recomputes the camera options from the current node list and drops the
//! previous camera choice.

use std::collections::BTreeSet;

use smarttrace_protocol::Ident;
use smarttrace_protocol::TrackNode;

use crate::error::FilterError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(Ident),
}

impl Selection {
    pub fn admits(&self, id: &Ident) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == id,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn sequence_label(&self) -> String {
        match self {
            Selection::All => "All Sequences".to_string(),
            Selection::Only(id) => format!("Sequence {id}"),
        }
    }

    pub fn camera_label(&self) -> String {
        match self {
            Selection::All => "All Cameras".to_string(),
            Selection::Only(id) => format!("Camera {id}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub sequence: Selection,
    pub camera: Selection,
}

#[derive(Debug, Clone, Default)]
pub struct CascadingFilter {
    nodes: Vec<TrackNode>,
    sequence_options: Vec<Ident>,
    camera_options: Vec<Ident>,
    state: FilterState,
}

impl CascadingFilter {
    pub fn new(nodes: Vec<TrackNode>) -> Self {
        let mut filter = Self::default();
        filter.set_nodes(nodes);
        filter
    }

    /// Replace the node list and reset both levels to "all".
    pub fn set_nodes(&mut self, nodes: Vec<TrackNode>) {
        self.sequence_options = distinct(nodes.iter().map(|node| &node.sequence_id));
        self.nodes = nodes;
        self.state = FilterState::default();
        self.camera_options.clear();
    }

    pub fn set_sequence(&mut self, selection: Selection) {
        self.camera_options = match &selection {
            Selection::All => Vec::new(),
            Selection::Only(sequence) => distinct(
                self.nodes
                    .iter()
                    .filter(|node| &node.sequence_id == sequence)
                    .map(|node| &node.camera_id),
            ),
        };
        self.state.sequence = selection;
        self.state.camera = Selection::All;
    }

    pub fn set_camera(&mut self, selection: Selection) -> Result<(), FilterError> {
        if !self.camera_enabled() && !selection.is_all() {
            return Err(FilterError::CameraDisabled);
        }
        self.state.camera = selection;
        Ok(())
    }

    /// Nodes admitted by the current selection, in their original order.
    pub fn filtered(&self) -> Vec<&TrackNode> {
        self.nodes
            .iter()
            .filter(|node| {
                self.state.sequence.admits(&node.sequence_id)
                    && self.state.camera.admits(&node.camera_id)
            })
            .collect()
    }

    /// Step the sequence selector through "all" and each option.
    pub fn cycle_sequence(&mut self, forward: bool) {
        let next = cycle(&self.sequence_options, &self.state.sequence, forward);
        self.set_sequence(next);
    }

    /// Step the camera selector; returns `false` while the level is disabled.
    pub fn cycle_camera(&mut self, forward: bool) -> bool {
        if !self.camera_enabled() {
            return false;
        }
        self.state.camera = cycle(&self.camera_options, &self.state.camera, forward);
        true
    }

    pub fn camera_enabled(&self) -> bool {
        !self.state.sequence.is_all()
    }

    pub fn sequence_options(&self) -> &[Ident] {
        &self.sequence_options
    }

    pub fn camera_options(&self) -> &[Ident] {
        &self.camera_options
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn nodes(&self) -> &[TrackNode] {
        &self.nodes
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a Ident>) -> Vec<Ident> {
    ids.collect::<BTreeSet<_>>().into_iter().cloned().collect()
}

fn cycle(options: &[Ident], current: &Selection, forward: bool) -> Selection {
    // Position 0 is "all", option i sits at i + 1.
    let slots = options.len() + 1;
    let position = match current {
        Selection::All => 0,
        Selection::Only(id) => options
            .iter()
            .position(|option| option == id)
            .map_or(0, |index| index + 1),
    };
    let next = if forward {
        (position + 1) % slots
    } else {
        (position + slots - 1) % slots
    };
    match next {
        0 => Selection::All,
        index => Selection::Only(options[index - 1].clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(seq: i64, cam: i64, obj: i64) -> TrackNode {
        TrackNode::new(seq, cam, obj)
    }

    fn ids(values: &[i64]) -> Vec<Ident> {
        values.iter().map(|v| Ident::from(*v)).collect()
    }

    fn only(value: &str) -> Selection {
        Selection::Only(Ident::from(value))
    }

    fn sample() -> Vec<TrackNode> {
        vec![node(1, 2, 10), node(1, 3, 11), node(2, 2, 12)]
    }

    #[test]
    fn new_filter_starts_unfiltered() {
        let filter = CascadingFilter::new(vec![node(3, 1, 0), node(1, 1, 1), node(3, 2, 2)]);
        assert_eq!(filter.sequence_options(), ids(&[1, 3]).as_slice());
        assert!(filter.camera_options().is_empty());
        assert!(!filter.camera_enabled());
        assert_eq!(filter.state(), &FilterState::default());
    }

    #[test]
    fn sequence_then_camera_narrows_to_one_node() {
        let mut filter = CascadingFilter::new(sample());
        filter.set_sequence(only("1"));
        assert_eq!(filter.camera_options(), ids(&[2, 3]).as_slice());

        filter.set_camera(only("3")).unwrap();
        let filtered = filter.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0], &node(1, 3, 11));
    }

    #[test]
    fn changing_sequence_resets_camera() {
        let mut filter = CascadingFilter::new(sample());
        filter.set_sequence(only("1"));
        filter.set_camera(only("2")).unwrap();

        filter.set_sequence(only("2"));
        assert_eq!(filter.state().camera, Selection::All);
        assert_eq!(filter.camera_options(), ids(&[2]).as_slice());

        filter.set_sequence(Selection::All);
        assert_eq!(filter.state().camera, Selection::All);
        assert!(filter.camera_options().is_empty());
    }

    #[test]
    fn camera_cannot_be_chosen_without_sequence() {
        let mut filter = CascadingFilter::new(sample());
        assert_eq!(filter.set_camera(only("2")), Err(FilterError::CameraDisabled));
        assert_eq!(filter.set_camera(Selection::All), Ok(()));
        assert!(!filter.cycle_camera(true));
    }

    #[test]
    fn all_all_is_identity() {
        let nodes = sample();
        let filter = CascadingFilter::new(nodes.clone());
        let filtered: Vec<TrackNode> = filter.filtered().into_iter().cloned().collect();
        assert_eq!(filtered, nodes);
    }

    #[test]
    fn filtered_is_a_pure_narrowing() {
        let nodes = vec![
            node(1, 2, 0),
            node(2, 2, 1),
            node(1, 3, 2),
            node(1, 2, 3),
            node(3, 1, 4),
        ];
        let mut filter = CascadingFilter::new(nodes.clone());
        let sequences = filter.sequence_options().to_vec();
        for sequence in sequences {
            filter.set_sequence(Selection::Only(sequence.clone()));
            let cameras = filter.camera_options().to_vec();
            for camera in cameras.into_iter().map(Selection::Only).chain([Selection::All]) {
                filter.set_camera(camera.clone()).unwrap();
                let kept = filter.filtered();
                // object ids are unique in this fixture
                for candidate in &nodes {
                    let matches =
                        candidate.sequence_id == sequence && camera.admits(&candidate.camera_id);
                    let included = kept.iter().any(|n| n.object_id == candidate.object_id);
                    assert_eq!(matches, included, "{candidate:?} under {sequence}/{camera:?}");
                }
                let positions: Vec<i64> = kept
                    .iter()
                    .filter_map(|n| n.object_id.as_integer())
                    .collect();
                let mut sorted = positions.clone();
                sorted.sort_unstable();
                assert_eq!(positions, sorted, "order must be preserved");
            }
        }
    }

    #[test]
    fn mixed_id_kinds_match() {
        let nodes = vec![
            TrackNode::new("1", "3", 0_i64),
            TrackNode::new(1_i64, 3_i64, 1_i64),
        ];
        let mut filter = CascadingFilter::new(nodes);
        assert_eq!(filter.sequence_options().len(), 1);
        filter.set_sequence(Selection::Only(Ident::from(1_i64)));
        filter.set_camera(only("3")).unwrap();
        assert_eq!(filter.filtered().len(), 2);
    }

    #[test]
    fn cycling_wraps_through_all() {
        let mut filter = CascadingFilter::new(sample());
        filter.cycle_sequence(true);
        assert_eq!(filter.state().sequence, only("1"));
        filter.cycle_sequence(true);
        assert_eq!(filter.state().sequence, only("2"));
        filter.cycle_sequence(true);
        assert_eq!(filter.state().sequence, Selection::All);
        filter.cycle_sequence(false);
        assert_eq!(filter.state().sequence, only("2"));

        filter.set_sequence(only("1"));
        assert!(filter.cycle_camera(false));
        assert_eq!(filter.state().camera, only("3"));
        assert_eq!(filter.state().camera.camera_label(), "Camera 3");
    }

    #[test]
    fn empty_node_list_is_valid() {
        let mut filter = CascadingFilter::new(Vec::new());
        filter.cycle_sequence(true);
        assert_eq!(filter.state().sequence, Selection::All);
        assert!(filter.filtered().is_empty());
    }
}
