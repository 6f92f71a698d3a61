use std::collections::HashSet;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Alignment;
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
use smarttrace_core::Attachment;
use smarttrace_core::SearchQuery;
use smarttrace_core::SearchSession;
use smarttrace_core::SearchView;
use smarttrace_core::grid::GridModel;

use crate::card_grid::CardGridState;
use crate::card_grid::Direction;
use crate::card_grid::contains;
use crate::hint_bar::HintBar;
use crate::text::truncate_to_width;

const INPUT_HEIGHT: u16 = 4;
const HINT_HEIGHT: u16 = 2;
const EMPTY_STATE: &str = "Describe a subject or attach an image, then press Enter.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchFocus {
    Query,
    Attachment,
    Results,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SearchAction {
    None,
    Submit,
    LoadAttachment(PathBuf),
    OpenDetail(usize),
    Quit,
}

#[derive(Debug)]
pub(crate) struct SearchScreen {
    query: String,
    attachment_path: String,
    attachment: Option<Attachment>,
    attachment_error: Option<String>,
    focus: SearchFocus,
    grid: CardGridState,
    button_area: Option<Rect>,
    query_area: Option<Rect>,
    notice: Option<String>,
}

impl SearchScreen {
    pub(crate) fn new() -> Self {
        Self {
            query: String::new(),
            attachment_path: String::new(),
            attachment: None,
            attachment_error: None,
            focus: SearchFocus::Query,
            grid: CardGridState::default(),
            button_area: None,
            query_area: None,
            notice: None,
        }
    }

    pub(crate) fn query(&self) -> SearchQuery {
        SearchQuery::new(&self.query, self.attachment.clone())
    }

    pub(crate) fn set_attachment(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
        self.attachment_error = None;
    }

    pub(crate) fn set_attachment_error(&mut self, message: String) {
        self.attachment = None;
        self.attachment_error = Some(message);
    }

    /// One-line message shown above the hints, e.g. after a failed hand-off.
    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// New result list arrived: start browsing from the first card.
    pub(crate) fn show_results(&mut self, has_results: bool) {
        self.grid.reset();
        if has_results {
            self.focus = SearchFocus::Results;
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent, session: &SearchSession) -> SearchAction {
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    SearchFocus::Query => SearchFocus::Attachment,
                    SearchFocus::Attachment => SearchFocus::Results,
                    SearchFocus::Results => SearchFocus::Query,
                };
                return SearchAction::None;
            }
            KeyCode::BackTab => {
                self.focus = match self.focus {
                    SearchFocus::Query => SearchFocus::Results,
                    SearchFocus::Attachment => SearchFocus::Query,
                    SearchFocus::Results => SearchFocus::Attachment,
                };
                return SearchAction::None;
            }
            _ => {}
        }
        match self.focus {
            SearchFocus::Query => self.handle_query_key(key, session),
            SearchFocus::Attachment => self.handle_attachment_key(key, session),
            SearchFocus::Results => self.handle_results_key(key, session),
        }
    }

    fn handle_query_key(&mut self, key: KeyEvent, session: &SearchSession) -> SearchAction {
        match key.code {
            KeyCode::Enter => self.submit_action(session),
            KeyCode::Esc => {
                self.focus = SearchFocus::Results;
                SearchAction::None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.clear();
                SearchAction::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                SearchAction::None
            }
            KeyCode::Backspace => {
                self.query.pop();
                SearchAction::None
            }
            _ => SearchAction::None,
        }
    }

    fn handle_attachment_key(&mut self, key: KeyEvent, session: &SearchSession) -> SearchAction {
        match key.code {
            KeyCode::Enter => {
                let path = self.attachment_path.trim();
                if self.attachment.is_none() && !path.is_empty() {
                    return SearchAction::LoadAttachment(PathBuf::from(path));
                }
                self.submit_action(session)
            }
            KeyCode::Esc => {
                self.focus = SearchFocus::Query;
                SearchAction::None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear_attachment();
                SearchAction::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.attachment_path.push(c);
                self.attachment = None;
                self.attachment_error = None;
                SearchAction::None
            }
            KeyCode::Backspace => {
                self.attachment_path.pop();
                self.attachment = None;
                self.attachment_error = None;
                SearchAction::None
            }
            _ => SearchAction::None,
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent, session: &SearchSession) -> SearchAction {
        let len = session.results().len();
        let ready = matches!(session.view(), SearchView::Results(_));
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.grid.move_selection(Direction::Left, len),
            KeyCode::Right | KeyCode::Char('l') => self.grid.move_selection(Direction::Right, len),
            KeyCode::Up | KeyCode::Char('k') => self.grid.move_selection(Direction::Up, len),
            KeyCode::Down | KeyCode::Char('j') => self.grid.move_selection(Direction::Down, len),
            KeyCode::Char('/') => self.focus = SearchFocus::Query,
            KeyCode::Enter if ready && len > 0 => return SearchAction::OpenDetail(self.grid.selected()),
            KeyCode::Esc | KeyCode::Char('q') => return SearchAction::Quit,
            _ => {}
        }
        SearchAction::None
    }

    /// Pasted text goes into the focused field, newlines dropped.
    pub(crate) fn handle_paste(&mut self, text: &str) {
        let text: String = text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        match self.focus {
            SearchFocus::Query => self.query.push_str(&text),
            SearchFocus::Attachment => {
                self.attachment_path.push_str(text.trim());
                self.attachment = None;
                self.attachment_error = None;
            }
            SearchFocus::Results => {}
        }
    }

    pub(crate) fn handle_click(
        &mut self,
        column: u16,
        row: u16,
        session: &SearchSession,
    ) -> SearchAction {
        if let Some(area) = self.button_area
            && contains(area, column, row)
        {
            return self.submit_action(session);
        }
        if let Some(area) = self.query_area
            && contains(area, column, row)
        {
            self.focus = SearchFocus::Query;
            return SearchAction::None;
        }
        if matches!(session.view(), SearchView::Results(_))
            && let Some(index) = self.grid.hit(column, row)
        {
            self.focus = SearchFocus::Results;
            return SearchAction::OpenDetail(index);
        }
        SearchAction::None
    }

    fn submit_action(&self, session: &SearchSession) -> SearchAction {
        if session.can_submit(&self.query()) {
            SearchAction::Submit
        } else {
            SearchAction::None
        }
    }

    fn clear_attachment(&mut self) {
        self.attachment_path.clear();
        self.attachment = None;
        self.attachment_error = None;
    }

    pub(crate) fn render(
        &mut self,
        session: &SearchSession,
        failed_thumbnails: &HashSet<String>,
        fallback_thumbnail: &str,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let [input_area, results_area, hint_area] = Layout::vertical([
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(HINT_HEIGHT),
        ])
        .areas(area);

        self.render_input(session, input_area, buf);

        let view = session.view();
        let heading = match &view {
            SearchView::Results(GridModel {
                heading: Some(heading),
                ..
            }) => format!(" {heading} "),
            _ => " Results ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Line::from(heading).bold().cyan());
        let inner = block.inner(results_area);
        block.render(results_area, buf);
        match view {
            SearchView::Empty => centered_line(Line::from(EMPTY_STATE).dim(), inner, buf),
            SearchView::Loading => {
                centered_line(Line::from(session.trigger_label()).yellow(), inner, buf)
            }
            SearchView::Results(grid) => {
                self.grid
                    .render(&grid, failed_thumbnails, fallback_thumbnail, inner, buf);
            }
            SearchView::Failed { message, grid } => {
                if inner.height > 0 {
                    Paragraph::new(Line::from(message).red())
                        .render(Rect::new(inner.x, inner.y, inner.width, 1), buf);
                }
                let rest = Rect::new(
                    inner.x,
                    inner.y.saturating_add(1),
                    inner.width,
                    inner.height.saturating_sub(1),
                );
                self.grid
                    .render(&grid, failed_thumbnails, fallback_thumbnail, rest, buf);
            }
        }

        let hints = match self.focus {
            SearchFocus::Results => vec![
                ("←↑↓→", "move"),
                ("Enter", "open"),
                ("/", "edit query"),
                ("Tab", "next field"),
                ("q", "quit"),
            ],
            SearchFocus::Query | SearchFocus::Attachment => vec![
                ("Enter", "run query"),
                ("Tab", "next field"),
                ("Ctrl+U", "clear"),
                ("Esc", "leave field"),
            ],
        };
        let status = self.notice.clone().map(|notice| Line::from(notice).yellow());
        HintBar::new(hints).with_status(status).render(hint_area, buf);
    }

    fn render_input(&mut self, session: &SearchSession, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Line::from(" SmartTrace Retrieval ").bold().cyan());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let label = session.trigger_label();
        let button_width = (label.len() as u16 + 4).min(inner.width);
        let [fields_area, button_area] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(button_width)])
                .areas(inner);
        let field_width = usize::from(fields_area.width.saturating_sub(8));

        let query_line = Line::from(vec![
            field_label("Query", self.focus == SearchFocus::Query),
            Span::from(truncate_to_width(&self.query, field_width)),
            cursor(self.focus == SearchFocus::Query),
        ]);
        let image_value: Span<'static> = match (&self.attachment, &self.attachment_error) {
            (Some(attachment), _) => Span::from(truncate_to_width(
                &format!(
                    "{} ({}, {} bytes)",
                    attachment.file_name,
                    attachment.mime,
                    attachment.bytes.len()
                ),
                field_width,
            ))
            .green(),
            (None, Some(error)) => Span::from(truncate_to_width(error, field_width)).red(),
            (None, None) if self.attachment_path.is_empty() => Span::from("(none)").dim(),
            (None, None) => Span::from(truncate_to_width(&self.attachment_path, field_width)),
        };
        let image_line = Line::from(vec![
            field_label("Image", self.focus == SearchFocus::Attachment),
            image_value,
            cursor(self.focus == SearchFocus::Attachment),
        ]);
        Paragraph::new(vec![query_line, image_line]).render(fields_area, buf);
        self.query_area = Some(Rect::new(fields_area.x, fields_area.y, fields_area.width, 1));

        let enabled = session.can_submit(&self.query());
        let button = Line::from(format!("[ {label} ]"));
        let button = if enabled {
            button.cyan().bold()
        } else {
            button.dark_gray()
        };
        let button_rect = Rect::new(button_area.x, button_area.y, button_area.width, 1);
        Paragraph::new(button)
            .alignment(Alignment::Right)
            .render(button_rect, buf);
        self.button_area = Some(button_rect);
    }
}

fn field_label(name: &'static str, focused: bool) -> Span<'static> {
    let text = format!("{name:<6} ");
    if focused {
        Span::from(text).cyan().bold()
    } else {
        Span::from(text).dim()
    }
}

fn cursor(focused: bool) -> Span<'static> {
    if focused {
        Span::from("▏").cyan()
    } else {
        Span::from("")
    }
}

fn centered_line(line: Line<'static>, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height / 2;
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(Rect::new(area.x, y, area.width, 1), buf);
}
