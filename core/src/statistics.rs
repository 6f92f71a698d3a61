use std::collections::BTreeMap;
use std::collections::BTreeSet;

use smarttrace_protocol::Ident;
use smarttrace_protocol::TrackNode;

/// Sequence → cameras table shown in the detail sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackStatistics {
    rows: Vec<StatisticsRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsRow {
    pub sequence: Ident,
    /// Distinct cameras that observed the track within `sequence`, ascending.
    pub cameras: Vec<Ident>,
}

impl TrackStatistics {
    pub fn from_nodes(nodes: &[TrackNode]) -> Self {
        let mut grouped: BTreeMap<&Ident, BTreeSet<&Ident>> = BTreeMap::new();
        for node in nodes {
            grouped
                .entry(&node.sequence_id)
                .or_default()
                .insert(&node.camera_id);
        }
        let rows = grouped
            .into_iter()
            .map(|(sequence, cameras)| StatisticsRow {
                sequence: sequence.clone(),
                cameras: cameras.into_iter().cloned().collect(),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[StatisticsRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl StatisticsRow {
    pub fn sequence_label(&self) -> String {
        format!("Seq {}", self.sequence)
    }

    pub fn cameras_label(&self) -> String {
        let joined = self
            .cameras
            .iter()
            .map(Ident::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!("Cam {joined}")
    }
}

/// Node count as shown in the detail header: at least two digits.
pub fn format_node_count(count: usize) -> String {
    format!("{count:02}")
}
