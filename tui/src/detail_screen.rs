//! Detail view of one track: header, per-sequence statistics, the cascading
//! filter over its sightings, the sighting cards and the camera timeline.

use std::collections::HashSet;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use smarttrace_core::DetailView;
use smarttrace_core::axis_column;

use crate::card_grid::CardGridState;
use crate::card_grid::Direction;
use crate::card_grid::contains;
use crate::hint_bar::HintBar;
use crate::text::truncate_to_width;

const HEADER_HEIGHT: u16 = 4;
const TIMELINE_HEIGHT: u16 = 4;
const HINT_HEIGHT: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;
const CAMERA_LOCKED_NOTICE: &str = "Select a sequence before filtering by camera.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DetailFocus {
    Nodes,
    Timeline,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DetailAction {
    None,
    Back,
    PlayCard(usize),
    PlayMarker(usize),
}

#[derive(Debug)]
pub(crate) struct DetailScreen {
    view: DetailView,
    grid: CardGridState,
    focus: DetailFocus,
    selected_marker: usize,
    marker_hits: Vec<(Rect, usize)>,
    notice: Option<String>,
}

impl DetailScreen {
    pub(crate) fn new(view: DetailView) -> Self {
        Self {
            view,
            grid: CardGridState::default(),
            focus: DetailFocus::Nodes,
            selected_marker: 0,
            marker_hits: Vec::new(),
            notice: None,
        }
    }

    pub(crate) fn view(&self) -> &DetailView {
        &self.view
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> DetailAction {
        self.notice = None;
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => return DetailAction::Back,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    DetailFocus::Nodes if !self.view.timeline().is_empty() => DetailFocus::Timeline,
                    _ => DetailFocus::Nodes,
                };
                return DetailAction::None;
            }
            KeyCode::Char('s') => {
                self.view.filter_mut().cycle_sequence(true);
                self.grid.reset();
                return DetailAction::None;
            }
            KeyCode::Char('S') => {
                self.view.filter_mut().cycle_sequence(false);
                self.grid.reset();
                return DetailAction::None;
            }
            KeyCode::Char(c @ ('c' | 'C')) => {
                if self.view.filter_mut().cycle_camera(c == 'c') {
                    self.grid.reset();
                } else {
                    self.notice = Some(CAMERA_LOCKED_NOTICE.to_string());
                }
                return DetailAction::None;
            }
            _ => {}
        }
        match self.focus {
            DetailFocus::Nodes => self.handle_nodes_key(key),
            DetailFocus::Timeline => self.handle_timeline_key(key),
        }
    }

    fn handle_nodes_key(&mut self, key: KeyEvent) -> DetailAction {
        let len = self.view.filter().filtered().len();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.grid.move_selection(Direction::Left, len),
            KeyCode::Right | KeyCode::Char('l') => self.grid.move_selection(Direction::Right, len),
            KeyCode::Up | KeyCode::Char('k') => self.grid.move_selection(Direction::Up, len),
            KeyCode::Down | KeyCode::Char('j') => self.grid.move_selection(Direction::Down, len),
            KeyCode::Enter if len > 0 => return DetailAction::PlayCard(self.grid.selected()),
            _ => {}
        }
        DetailAction::None
    }

    fn handle_timeline_key(&mut self, key: KeyEvent) -> DetailAction {
        let last = self.view.timeline().markers().len().saturating_sub(1);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_marker = self.selected_marker.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected_marker = (self.selected_marker + 1).min(last);
            }
            KeyCode::Enter if !self.view.timeline().is_empty() => {
                return DetailAction::PlayMarker(self.selected_marker);
            }
            _ => {}
        }
        DetailAction::None
    }

    pub(crate) fn handle_click(&mut self, column: u16, row: u16) -> DetailAction {
        if let Some(index) = self.grid.hit(column, row) {
            self.focus = DetailFocus::Nodes;
            return DetailAction::PlayCard(index);
        }
        if let Some((_, marker)) = self
            .marker_hits
            .iter()
            .find(|(rect, _)| contains(*rect, column, row))
        {
            self.focus = DetailFocus::Timeline;
            self.selected_marker = *marker;
            return DetailAction::PlayMarker(*marker);
        }
        DetailAction::None
    }

    pub(crate) fn render(&mut self, failed_thumbnails: &HashSet<String>, area: Rect, buf: &mut Buffer) {
        let [header_area, body_area, timeline_area, hint_area] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(TIMELINE_HEIGHT),
            Constraint::Length(HINT_HEIGHT),
        ])
        .areas(area);
        let [sidebar_area, nodes_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
                .areas(body_area);

        self.render_header(failed_thumbnails, header_area, buf);
        self.render_statistics(sidebar_area, buf);
        self.render_nodes(failed_thumbnails, nodes_area, buf);
        self.render_timeline(timeline_area, buf);

        let mut hints = vec![("Esc", "back"), ("s/S", "sequence"), ("c/C", "camera")];
        match self.focus {
            DetailFocus::Nodes => hints.extend([("←↑↓→", "move"), ("Enter", "play")]),
            DetailFocus::Timeline => hints.extend([("←→", "camera"), ("Enter", "play")]),
        }
        hints.push(("Tab", "switch panel"));
        let status = self.notice.clone().map(|notice| Line::from(notice).yellow());
        HintBar::new(hints).with_status(status).render(hint_area, buf);
    }

    fn render_header(&self, failed_thumbnails: &HashSet<String>, area: Rect, buf: &mut Buffer) {
        let header = self.view.header();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Line::from(" Track Detail ").bold().cyan());
        let inner = block.inner(area);
        block.render(area, buf);

        let summary = Line::from(vec![
            Span::from("Global ID: ").dim(),
            Span::from(header.global_id).bold(),
            Span::from("   Confidence: ").dim(),
            Span::from(header.confidence).green(),
            Span::from("   Sightings: ").dim(),
            Span::from(header.node_count),
        ]);
        let image = match header.thumbnail {
            Some(location) if !failed_thumbnails.contains(&location) => {
                Span::from(location).dim()
            }
            _ => Span::from(format!("[default] {}", self.view.fallback_thumbnail())).dark_gray(),
        };
        let image_line = Line::from(vec![Span::from("Image: ").dim(), image]);
        Paragraph::new(vec![summary, image_line]).render(inner, buf);
    }

    fn render_statistics(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Line::from(" Statistics ").bold());
        let inner = block.inner(area);
        block.render(area, buf);
        let width = usize::from(inner.width);
        let statistics = self.view.statistics();
        let lines: Vec<Line<'static>> = if statistics.is_empty() {
            vec![Line::from("No sightings").dim()]
        } else {
            statistics
                .rows()
                .iter()
                .flat_map(|row| {
                    [
                        Line::from(row.sequence_label()).bold(),
                        Line::from(truncate_to_width(&format!("  {}", row.cameras_label()), width))
                            .dim(),
                    ]
                })
                .collect()
        };
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_nodes(&mut self, failed_thumbnails: &HashSet<String>, area: Rect, buf: &mut Buffer) {
        let border = match self.focus {
            DetailFocus::Nodes => Style::default().fg(Color::Cyan),
            DetailFocus::Timeline => Style::default().fg(Color::DarkGray),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Line::from(" Sightings ").bold());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let filter = self.view.filter();
        let state = filter.state();
        let camera = if filter.camera_enabled() {
            Span::from(state.camera.camera_label())
        } else {
            Span::from(state.camera.camera_label()).dark_gray()
        };
        let filter_line = Line::from(vec![
            Span::from("Filter: ").dim(),
            Span::from(state.sequence.sequence_label()),
            Span::from(" / ").dim(),
            camera,
        ]);
        Paragraph::new(filter_line).render(Rect::new(inner.x, inner.y, inner.width, 1), buf);

        let grid_area = Rect::new(
            inner.x,
            inner.y.saturating_add(1),
            inner.width,
            inner.height.saturating_sub(1),
        );
        let model = self.view.grid();
        self.grid.render(
            &model,
            failed_thumbnails,
            self.view.fallback_thumbnail(),
            grid_area,
            buf,
        );
    }

    fn render_timeline(&mut self, area: Rect, buf: &mut Buffer) {
        self.marker_hits.clear();
        let border = match self.focus {
            DetailFocus::Timeline => Style::default().fg(Color::Cyan),
            DetailFocus::Nodes => Style::default().fg(Color::DarkGray),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Line::from(" Camera Timeline ").bold());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 || inner.width < 3 {
            return;
        }
        let markers = self.view.timeline().markers();
        if markers.is_empty() {
            Paragraph::new(Line::from("No cameras").dim()).render(inner, buf);
            return;
        }

        // one cell of padding on each side so edge labels stay readable
        let axis = Rect::new(inner.x + 1, inner.y, inner.width - 2, 1);
        let labels_y = inner.y + 1;
        buf.set_string(
            axis.x,
            axis.y,
            "─".repeat(usize::from(axis.width)),
            Style::default().fg(Color::DarkGray),
        );
        for (index, marker) in markers.iter().enumerate() {
            let column = axis.x + axis_column(marker.position, axis.width);
            let style = if index == self.selected_marker && self.focus == DetailFocus::Timeline {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Yellow)
            };
            buf.set_string(column, axis.y, "●", style);

            let label = format!("CAM-{}", marker.camera);
            let label_width = label.chars().count() as u16;
            let start = column
                .saturating_sub(label_width / 2)
                .max(inner.x)
                .min(inner.right().saturating_sub(label_width));
            buf.set_string(start, labels_y, &label, style);
            let hit = Rect::new(start, axis.y, label_width.max(1), 2).intersection(inner);
            self.marker_hits.push((hit, index));
        }
    }
}
