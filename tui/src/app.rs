use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use smarttrace_core::Attachment;
use smarttrace_core::Config;
use smarttrace_core::DetailHandoff;
use smarttrace_core::DetailView;
use smarttrace_core::ExternalPlayer;
use smarttrace_core::Resolution;
use smarttrace_core::ResultCache;
use smarttrace_core::RetrievalBackend;
use smarttrace_core::SearchSession;
use smarttrace_core::VideoSessionController;
use smarttrace_core::VideoState;
use smarttrace_core::error::ConfigError;
use smarttrace_core::protocol::Track;
use smarttrace_core::protocol::TrackNode;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::detail_screen::DetailAction;
use crate::detail_screen::DetailScreen;
use crate::search_screen::SearchAction;
use crate::search_screen::SearchScreen;
use crate::tui::Tui;
use crate::video_modal::ModalAction;
use crate::video_modal::VideoModal;

const NO_PLAYER_NOTE: &str = "No media player configured. Set `player` in config.toml to watch clips.";

pub(crate) struct App {
    config: Config,
    backend: Arc<dyn RetrievalBackend>,
    app_event_tx: AppEventSender,
    search: SearchSession,
    search_screen: SearchScreen,
    handoff: DetailHandoff,
    detail: Option<DetailScreen>,
    video: VideoSessionController<ExternalPlayer>,
    video_modal: VideoModal,
    player_note: Option<String>,
    failed_thumbnails: HashSet<String>,
    thumbnail_generation: u64,
    exit: bool,
}

impl App {
    pub(crate) fn new(
        config: Config,
        backend: Arc<dyn RetrievalBackend>,
        app_event_tx: AppEventSender,
    ) -> Result<Self, ConfigError> {
        let cache = match &config.session_file {
            Some(path) => ResultCache::with_session_file(path.clone()),
            None => ResultCache::in_memory(),
        };
        let search = SearchSession::new(cache, config.fallback_thumbnail.clone());
        let video = VideoSessionController::new(ExternalPlayer::new(config.player.clone()))
            .with_base_url(config.base_url()?);
        Ok(Self {
            config,
            backend,
            app_event_tx,
            search,
            search_screen: SearchScreen::new(),
            handoff: DetailHandoff::default(),
            detail: None,
            video,
            video_modal: VideoModal::default(),
            player_note: None,
            failed_thumbnails: HashSet::new(),
            thumbnail_generation: 0,
            exit: false,
        })
    }

    pub(crate) async fn run(
        mut self,
        tui: &mut Tui,
        mut app_event_rx: UnboundedReceiver<AppEvent>,
    ) -> Result<()> {
        use tokio_stream::StreamExt;

        self.restore_session();
        let mut tui_events = tui.event_stream();
        while !self.is_exiting() {
            tui.terminal
                .draw(|frame| self.render(frame.area(), frame.buffer_mut()))?;
            select! {
                Some(event) = app_event_rx.recv() => self.handle_app_event(event),
                Some(event) = tui_events.next() => match event? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Paste(text) => self.search_screen.handle_paste(&text),
                    _ => {}
                },
                else => break,
            }
        }
        self.video.close();
        Ok(())
    }

    /// Show the previous result list of this session, if one was cached.
    pub(crate) fn restore_session(&mut self) {
        if self.search.restore() {
            self.search_screen.show_results(!self.search.results().is_empty());
            self.probe_thumbnails();
        }
    }

    pub(crate) fn is_exiting(&self) -> bool {
        self.exit
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.exit = true;
            return;
        }
        if self.video.is_modal_visible() {
            let action = self.video_modal.handle_key(key);
            self.on_modal_action(action);
            return;
        }
        if let Some(detail) = self.detail.as_mut() {
            let action = detail.handle_key(key);
            self.on_detail_action(action);
        } else {
            let action = self.search_screen.handle_key(key, &self.search);
            self.on_search_action(action);
        }
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.video.is_modal_visible() {
            let action = self.video_modal.handle_click(mouse.column, mouse.row);
            self.on_modal_action(action);
            return;
        }
        if let Some(detail) = self.detail.as_mut() {
            let action = detail.handle_click(mouse.column, mouse.row);
            self.on_detail_action(action);
        } else {
            let action = self
                .search_screen
                .handle_click(mouse.column, mouse.row, &self.search);
            self.on_search_action(action);
        }
    }

    pub(crate) fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchFinished(outcome) => {
                self.search.complete(outcome);
                self.failed_thumbnails.clear();
                self.search_screen.set_notice(None);
                self.search_screen
                    .show_results(!self.search.results().is_empty());
                self.probe_thumbnails();
            }
            AppEvent::AttachmentLoaded(Ok(attachment)) => {
                tracing::debug!(file = %attachment.file_name, "attachment ready");
                self.search_screen.set_attachment(attachment);
            }
            AppEvent::AttachmentLoaded(Err(err)) => {
                tracing::warn!("{err}");
                self.search_screen.set_attachment_error(err.to_string());
            }
            AppEvent::VideoResolved { token, outcome } => {
                match self.video.resolve(token, outcome) {
                    Resolution::Applied(VideoState::Playing)
                        if !self.video.player().is_configured() =>
                    {
                        self.player_note = Some(NO_PLAYER_NOTE.to_string());
                    }
                    Resolution::Applied(_) | Resolution::Stale => {}
                }
            }
            AppEvent::ThumbnailMissing {
                generation,
                location,
            } => {
                if generation == self.thumbnail_generation {
                    self.failed_thumbnails.insert(location);
                } else {
                    tracing::debug!(%location, "dropping thumbnail probe for an older result list");
                }
            }
        }
    }

    fn on_search_action(&mut self, action: SearchAction) {
        match action {
            SearchAction::None => {}
            SearchAction::Submit => self.submit_search(),
            SearchAction::LoadAttachment(path) => self.load_attachment(path),
            SearchAction::OpenDetail(index) => {
                if let Some(track) = self.search.select(index) {
                    self.handoff.select(track);
                }
                self.open_detail();
            }
            SearchAction::Quit => self.exit = true,
        }
    }

    fn on_detail_action(&mut self, action: DetailAction) {
        let Some(detail) = self.detail.as_ref() else {
            return;
        };
        let view = detail.view();
        let node = match action {
            DetailAction::None => return,
            DetailAction::Back => {
                self.detail = None;
                return;
            }
            DetailAction::PlayCard(index) => view.node_for_card(index).cloned(),
            DetailAction::PlayMarker(index) => view.node_for_marker(index).cloned(),
        };
        let track = view.track().clone();
        if let Some(node) = node {
            self.start_video(&track, &node);
        }
    }

    fn on_modal_action(&mut self, action: ModalAction) {
        match action {
            ModalAction::None => {}
            ModalAction::Close => {
                self.video.close();
                self.player_note = None;
            }
            ModalAction::Resume => {
                if let Err(err) = self.video.resume() {
                    tracing::info!("resume refused: {err}");
                    self.player_note = Some(err.to_string());
                }
            }
        }
    }

    fn submit_search(&mut self) {
        let query = self.search_screen.query();
        if let Err(err) = self.search.begin(&query) {
            self.search_screen.set_notice(Some(err.to_string()));
            return;
        }
        self.search_screen.set_notice(None);
        let backend = Arc::clone(&self.backend);
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.search(&query).await;
            tx.send(AppEvent::SearchFinished(outcome));
        });
    }

    fn load_attachment(&mut self, path: PathBuf) {
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let outcome = Attachment::from_path(&path).await;
            tx.send(AppEvent::AttachmentLoaded(outcome));
        });
    }

    fn open_detail(&mut self) {
        match DetailView::open(&mut self.handoff, self.config.fallback_thumbnail.clone()) {
            Ok(view) => {
                self.search_screen.set_notice(None);
                self.detail = Some(DetailScreen::new(view));
            }
            Err(err) => {
                tracing::warn!("cannot open detail view: {err}");
                self.search_screen.set_notice(Some(err.to_string()));
            }
        }
    }

    fn start_video(&mut self, track: &Track, node: &TrackNode) {
        let (token, request) = self.video.open(track, node);
        self.player_note = None;
        let backend = Arc::clone(&self.backend);
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.fetch_video(&request).await;
            tx.send(AppEvent::VideoResolved { token, outcome });
        });
    }

    fn probe_thumbnails(&mut self) {
        self.thumbnail_generation += 1;
        let generation = self.thumbnail_generation;
        let locations: BTreeSet<String> = self
            .search
            .results()
            .iter()
            .flat_map(|track| {
                track
                    .thumbnail()
                    .into_iter()
                    .chain(track.nodes.iter().filter_map(|node| node.thumbnail_or(track)))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        for location in locations {
            let backend = Arc::clone(&self.backend);
            let tx = self.app_event_tx.clone();
            tokio::spawn(async move {
                if !backend.probe_thumbnail(&location).await {
                    tx.send(AppEvent::ThumbnailMissing {
                        generation,
                        location,
                    });
                }
            });
        }
    }

    pub(crate) fn render(&mut self, area: Rect, buf: &mut Buffer) {
        match self.detail.as_mut() {
            Some(detail) => detail.render(&self.failed_thumbnails, area, buf),
            None => self.search_screen.render(
                &self.search,
                &self.failed_thumbnails,
                &self.config.fallback_thumbnail,
                area,
                buf,
            ),
        }
        if let Some(session) = self.video.session() {
            self.video_modal
                .render(session, self.player_note.as_deref(), area, buf);
        }
    }
}
