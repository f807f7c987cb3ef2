//! Playlist acquisition
//!
//! - [`HttpFetch`] is the network seam, implemented by [`StandardHttpClient`].
//! - [`PlaylistFetcher`] downloads a single playlist, or lists a remote folder and
//!   downloads every playlist file in it concurrently.
//! - [`SourceProfile`] maps a [`Category`](crate::models::Category) to its endpoint
//!   and grouping strategy.

pub mod fetcher;
pub mod http_client;
pub mod profile;

pub use fetcher::{FetchOutcome, ListingEntry, PlaylistFetcher, select_playlist_files};
pub use http_client::{HttpFetch, StandardHttpClient};
pub use profile::{Acquisition, GroupingStrategy, SourceProfile, source_prefix};
