use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use serde_json::json;
use smarttrace_core::protocol::Track;

/// Buffer contents as one string per row, styles dropped.
pub(crate) fn buffer_rows(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect()
}

pub(crate) fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Tracks with ids `1..`, each seen by camera 2 and camera 3 in sequence 1.
pub(crate) fn tracks(scores: &[f64]) -> Vec<Track> {
    scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            serde_json::from_value(json!({
                "global_id": i + 1,
                "score": score,
                "thum_url": format!("/static/thumbs/{}.jpg", i + 1),
                "cameras": [3, 2],
                "tracks": [
                    {"seq_id": 1, "cam_id": 2, "obj_id": 10 + i, "detections": [{"frame_id": 1}]},
                    {"seq_id": 1, "cam_id": 3, "obj_id": 20 + i}
                ]
            }))
            .expect("valid track fixture")
        })
        .collect()
}
