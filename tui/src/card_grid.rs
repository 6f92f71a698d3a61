//! Fixed-size card grid shared by the result list and the sighting list.
//!
//! Cards are laid out left to right in as many columns as fit; only the rows
//! around the selection are drawn. The rectangles of the last draw are kept
//! so mouse clicks can be mapped back to a card.

use std::collections::HashSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Alignment;
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
use smarttrace_core::grid::Card;
use smarttrace_core::grid::GridModel;
use smarttrace_core::grid::Thumbnail;

use crate::text::truncate_to_width;

pub(crate) const CARD_WIDTH: u16 = 30;
pub(crate) const CARD_HEIGHT: u16 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Default)]
pub(crate) struct CardGridState {
    selected: usize,
    first_row: usize,
    columns: usize,
    hits: Vec<(Rect, usize)>,
}

impl CardGridState {
    pub(crate) fn selected(&self) -> usize {
        self.selected
    }

    pub(crate) fn reset(&mut self) {
        self.selected = 0;
        self.first_row = 0;
        self.hits.clear();
    }

    /// Keeps the selection inside `len` after the card set changed.
    pub(crate) fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub(crate) fn move_selection(&mut self, direction: Direction, len: usize) {
        if len == 0 {
            return;
        }
        let columns = self.columns.max(1);
        let last = len - 1;
        self.selected = match direction {
            Direction::Left => self.selected.saturating_sub(1),
            Direction::Right => (self.selected + 1).min(last),
            Direction::Up => self.selected.saturating_sub(columns),
            Direction::Down => (self.selected + columns).min(last),
        };
    }

    /// Card under a terminal cell from the last draw.
    pub(crate) fn hit(&self, column: u16, row: u16) -> Option<usize> {
        self.hits
            .iter()
            .find(|(rect, _)| contains(*rect, column, row))
            .map(|(_, index)| *index)
    }

    pub(crate) fn render(
        &mut self,
        model: &GridModel,
        failed_thumbnails: &HashSet<String>,
        fallback_thumbnail: &str,
        area: Rect,
        buf: &mut Buffer,
    ) {
        self.hits.clear();
        if area.height == 0 || area.width == 0 {
            return;
        }
        if model.cards.is_empty() {
            let text = model.placeholder.clone().unwrap_or_default();
            let y = area.y + area.height / 2;
            Paragraph::new(Line::from(text).dim())
                .alignment(Alignment::Center)
                .render(Rect::new(area.x, y, area.width, 1), buf);
            return;
        }

        self.columns = usize::from((area.width / CARD_WIDTH).max(1));
        let card_width = area.width / self.columns as u16;
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        self.clamp(model.cards.len());
        let selected_row = self.selected / self.columns;
        if selected_row < self.first_row {
            self.first_row = selected_row;
        } else if selected_row >= self.first_row + visible_rows {
            self.first_row = selected_row + 1 - visible_rows;
        }

        for (index, card) in model.cards.iter().enumerate() {
            let row = index / self.columns;
            if row < self.first_row || row >= self.first_row + visible_rows {
                continue;
            }
            let column = (index % self.columns) as u16;
            let y = area.y + (row - self.first_row) as u16 * CARD_HEIGHT;
            let height = CARD_HEIGHT.min(area.bottom().saturating_sub(y));
            let rect = Rect::new(area.x + column * card_width, y, card_width, height);
            let mut card = card.clone();
            if let Thumbnail::Remote(location) = &card.thumbnail
                && failed_thumbnails.contains(location)
            {
                card.mark_thumbnail_failed(fallback_thumbnail);
            }
            render_card(&card, index == self.selected, rect, buf);
            self.hits.push((rect, index));
        }
    }
}

fn render_card(card: &Card, selected: bool, area: Rect, buf: &mut Buffer) {
    let border = if selected {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(card.title.clone()).bold())
        .title(Line::from(card.badge.clone()).green().right_aligned());
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 {
        return;
    }
    let width = usize::from(inner.width);
    let thumbnail = match &card.thumbnail {
        Thumbnail::Remote(location) => Span::from(truncate_to_width(location, width)).dim(),
        Thumbnail::Fallback(location) => {
            Span::from(truncate_to_width(&format!("[default] {location}"), width)).dark_gray()
        }
    };
    let lines = vec![
        Line::from(truncate_to_width(&card.subtitle, width)),
        Line::from(thumbnail),
    ];
    Paragraph::new(lines).render(inner, buf);
}

pub(crate) fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}
