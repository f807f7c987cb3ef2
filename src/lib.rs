//! IPTV playlist aggregation core.
//!
//! Fetches iptv-org M3U playlists for one [`models::Category`], parses the
//! `#EXTINF`/URL pairs, groups them with global stream URL deduplication and
//! keeps the result in a TTL-bound file cache.

pub mod cache;
pub mod config;
pub mod errors;
pub mod grouping;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod sources;
pub mod utils;

pub use cache::CacheStore;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use models::{Category, ChannelEntry, GroupedPlaylist};
pub use pipeline::{PipelineOutput, PipelineStage, PlaylistPipeline};
