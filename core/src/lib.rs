//! Client-side state and service access for the SmartTrace retrieval browser.
//!
//! Nothing in here draws to a terminal; the `smarttrace-tui` crate renders the
//! models produced by these types.

mod client;
pub mod config;
mod detail;
pub mod error;
mod filter;
pub mod grid;
mod player;
mod result_cache;
mod search;
mod statistics;
mod timeline;
pub mod video;

pub use client::Attachment;
pub use client::HttpBackend;
pub use client::RetrievalBackend;
pub use client::SearchQuery;
pub use client::resolve_location;
pub use config::Config;
pub use config::ConfigOverrides;
pub use config::find_smarttrace_home;
pub use detail::DetailHandoff;
pub use detail::DetailHeader;
pub use detail::DetailView;
pub use filter::CascadingFilter;
pub use filter::FilterState;
pub use filter::Selection;
pub use player::ExternalPlayer;
pub use player::MediaPlayer;
pub use result_cache::ResultCache;
pub use search::SearchSession;
pub use search::SearchStatus;
pub use search::SearchView;
pub use statistics::StatisticsRow;
pub use statistics::TrackStatistics;
pub use statistics::format_node_count;
pub use timeline::Timeline;
pub use timeline::TimelineMarker;
pub use timeline::axis_column;
pub use video::Resolution;
pub use video::RequestToken;
pub use video::VideoSession;
pub use video::VideoSessionController;
pub use video::VideoState;

pub use smarttrace_protocol as protocol;
