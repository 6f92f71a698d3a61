//! Wire types shared by the SmartTrace retrieval client.
//!
//! Everything the search and video endpoints send or receive is defined here.
//! Identifiers are normalized into [`Ident`] as they are decoded so the rest
//! of the client never compares mixed numeric/string values.

mod ident;
mod track;
mod video;

pub use ident::Ident;
pub use track::Track;
pub use track::TrackNode;
pub use video::ErrorBody;
pub use video::VideoRequest;
pub use video::VideoResponse;
