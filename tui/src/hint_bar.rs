use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;

/// Bottom line of `key label` pairs.
#[derive(Clone, Debug, Default)]
pub(crate) struct HintBar {
    hints: Vec<(&'static str, &'static str)>,
    status: Option<Line<'static>>,
}

impl HintBar {
    pub(crate) fn new(hints: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            hints,
            status: None,
        }
    }

    /// Replaces the hints on the first row, e.g. with a transient error.
    pub(crate) fn with_status(mut self, status: Option<Line<'static>>) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let mut rows: Vec<Line<'static>> = Vec::new();
        if let Some(status) = &self.status {
            rows.push(status.clone());
        }
        if !self.hints.is_empty() {
            rows.push(self.hint_line());
        }
        for (offset, line) in rows.into_iter().take(area.height as usize).enumerate() {
            let y = area.y.saturating_add(offset as u16);
            Paragraph::new(line).render(Rect::new(area.x, y, area.width, 1), buf);
        }
    }

    fn hint_line(&self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (index, (key, label)) in self.hints.iter().enumerate() {
            if index > 0 {
                spans.push("  ".into());
            }
            spans.push(Span::from(*key).cyan().bold());
            spans.push(" ".into());
            spans.push(Span::from(*label).dim());
        }
        Line::from(spans)
    }
}
