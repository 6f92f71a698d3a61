use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;
use smarttrace_core::VideoSession;
use smarttrace_core::VideoState;
use smarttrace_core::video::ClipInfo;

use crate::card_grid::contains;
use crate::hint_bar::HintBar;

const MODAL_WIDTH: u16 = 72;
const MODAL_HEIGHT: u16 = 12;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ModalAction {
    None,
    Close,
    Resume,
}

/// Overlay for the active video session. Remembers where it was drawn so a
/// click outside can dismiss it.
#[derive(Debug, Default)]
pub(crate) struct VideoModal {
    area: Option<Rect>,
}

impl VideoModal {
    pub(crate) fn handle_key(&self, key: KeyEvent) -> ModalAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ModalAction::Close,
            KeyCode::Char('o') | KeyCode::Enter => ModalAction::Resume,
            _ => ModalAction::None,
        }
    }

    pub(crate) fn handle_click(&self, column: u16, row: u16) -> ModalAction {
        match self.area {
            Some(area) if contains(area, column, row) => ModalAction::None,
            _ => ModalAction::Close,
        }
    }

    /// `player_note` is a transient line about the media player, e.g. why
    /// playback could not start.
    pub(crate) fn render(
        &mut self,
        session: &VideoSession,
        player_note: Option<&str>,
        screen: Rect,
        buf: &mut Buffer,
    ) {
        let area = centered(screen, MODAL_WIDTH, MODAL_HEIGHT);
        self.area = Some(area);
        Clear.render(area, buf);

        let accent = match session.state() {
            VideoState::Playing => Color::Green,
            VideoState::Failed => Color::Red,
            VideoState::Idle | VideoState::Loading => Color::Yellow,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .title(Line::from(" Evidence Playback ").bold());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 {
            return;
        }

        let request = session.request();
        let mut lines = vec![
            Line::from(Span::styled(
                session.label().to_string(),
                Style::default().fg(accent).bold(),
            )),
            Line::from(format!(
                "Global ID {} | SEQ-{} | CAM-{} | OBJ-{}",
                request.global_id, request.seq_id, request.cam_id, request.obj_id
            ))
            .dim(),
            Line::from(""),
        ];
        match session.state() {
            VideoState::Playing => {
                if let Some(url) = session.media_url() {
                    lines.push(Line::from(vec![Span::from("Source: ").dim(), Span::from(url.to_string())]));
                }
                if let Some(clip) = session.clip() {
                    lines.push(Line::from(clip_summary(clip)).dim());
                }
            }
            VideoState::Failed => {
                if let Some(message) = session.message() {
                    lines.push(Line::from(message.to_string()).red());
                }
            }
            VideoState::Idle | VideoState::Loading => {}
        }
        if let Some(note) = player_note {
            lines.push(Line::from(note.to_string()).yellow());
        }

        let body = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(body, buf);
        let hints = match session.state() {
            VideoState::Playing => vec![("o", "play"), ("Esc", "close")],
            _ => vec![("Esc", "close")],
        };
        HintBar::new(hints).render(
            Rect::new(inner.x, inner.bottom() - 1, inner.width, 1),
            buf,
        );
    }
}

fn clip_summary(clip: &ClipInfo) -> String {
    let mut parts = Vec::new();
    if let (Some(start), Some(end)) = (clip.start_frame, clip.end_frame) {
        parts.push(format!("frames {start}-{end}"));
    }
    if let Some(fps) = clip.fps {
        parts.push(format!("{fps:.1} fps"));
    }
    if let Some(duration) = clip.duration_secs() {
        parts.push(format!("{duration:.1}s"));
    }
    match clip.cached {
        Some(true) => parts.push("cached".to_string()),
        Some(false) => parts.push("freshly cut".to_string()),
        None => {}
    }
    parts.join(" | ")
}

fn centered(screen: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}
