//! Search screen state: query submission, result list and the cache behind it.
//!
//! A submission runs in two halves so the caller can keep its UI live while
//! the request is in flight: [`SearchSession::begin`] validates, marks the
//! session loading and clears the cache, then [`SearchSession::complete`]
//! applies the outcome. [`SearchSession::submit`] does both around one
//! backend call.

use smarttrace_protocol::Track;

use crate::client::RetrievalBackend;
use crate::client::SearchQuery;
use crate::error::SearchError;
use crate::error::ServiceError;
use crate::grid::GridModel;
use crate::grid::result_grid;
use crate::result_cache::ResultCache;

pub const IDLE_TRIGGER_LABEL: &str = "Run Query";
pub const BUSY_TRIGGER_LABEL: &str = "Processing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// Nothing searched or restored yet.
    Idle,
    Loading,
    Ready,
    Failed { message: String },
}

/// What the result area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchView {
    Empty,
    Loading,
    Results(GridModel),
    Failed { message: String, grid: GridModel },
}

#[derive(Debug)]
pub struct SearchSession {
    cache: ResultCache,
    results: Vec<Track>,
    status: SearchStatus,
    fallback_thumbnail: String,
}

impl SearchSession {
    pub fn new(cache: ResultCache, fallback_thumbnail: impl Into<String>) -> Self {
        Self {
            cache,
            results: Vec::new(),
            status: SearchStatus::Idle,
            fallback_thumbnail: fallback_thumbnail.into(),
        }
    }

    /// Show the cached list, if any, without a network round-trip.
    pub fn restore(&mut self) -> bool {
        match self.cache.restore() {
            Some(results) => {
                tracing::info!(count = results.len(), "restored cached search results");
                self.results = results;
                self.status = SearchStatus::Ready;
                true
            }
            None => false,
        }
    }

    pub fn can_submit(&self, query: &SearchQuery) -> bool {
        !self.is_loading() && query.is_submittable()
    }

    pub fn begin(&mut self, query: &SearchQuery) -> Result<(), SearchError> {
        if self.is_loading() {
            return Err(SearchError::AlreadyRunning);
        }
        if !query.is_submittable() {
            return Err(SearchError::InputInvalid);
        }
        self.cache.clear();
        self.status = SearchStatus::Loading;
        Ok(())
    }

    /// Apply the backend outcome of the submission started by [`begin`](Self::begin).
    pub fn complete(&mut self, outcome: Result<Vec<Track>, ServiceError>) {
        match outcome {
            Ok(results) => self.accept(results),
            Err(err) => self.reject(&err),
        }
    }

    /// Returns the number of results on success.
    pub async fn submit(
        &mut self,
        backend: &dyn RetrievalBackend,
        query: &SearchQuery,
    ) -> Result<usize, SearchError> {
        self.begin(query)?;
        match backend.search(query).await {
            Ok(results) => {
                self.accept(results);
                Ok(self.results.len())
            }
            Err(err) => {
                self.reject(&err);
                Err(err.into())
            }
        }
    }

    fn accept(&mut self, results: Vec<Track>) {
        self.cache.put(&results);
        self.results = results;
        self.status = SearchStatus::Ready;
    }

    fn reject(&mut self, err: &ServiceError) {
        tracing::error!("search failed: {err}");
        self.results.clear();
        self.status = SearchStatus::Failed {
            message: format!("Search failed: {}", err.user_message()),
        };
    }

    pub fn view(&self) -> SearchView {
        match &self.status {
            SearchStatus::Idle => SearchView::Empty,
            SearchStatus::Loading => SearchView::Loading,
            SearchStatus::Ready => {
                SearchView::Results(result_grid(&self.results, &self.fallback_thumbnail))
            }
            SearchStatus::Failed { message } => SearchView::Failed {
                message: message.clone(),
                grid: result_grid(&[], &self.fallback_thumbnail),
            },
        }
    }

    /// The result handed to the detail view when its card is activated.
    /// Track at `index` of the current list. Nothing is selectable while a
    /// newer search is in flight.
    pub fn select(&self, index: usize) -> Option<Track> {
        if !matches!(self.status, SearchStatus::Ready) {
            return None;
        }
        self.results.get(index).cloned()
    }

    pub fn trigger_label(&self) -> &'static str {
        if self.is_loading() {
            BUSY_TRIGGER_LABEL
        } else {
            IDLE_TRIGGER_LABEL
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
