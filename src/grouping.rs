//! Grouping and global URL deduplication
//!
//! Triples are folded in the order they arrive: resource discovery order, then
//! line order within each resource. A URL is filed under the group of the first
//! triple that introduced it and is never repeated in any other group.

use std::collections::HashSet;
use tracing::debug;

use crate::models::{GroupedPlaylist, ParsedChannel};

/// Accumulates parsed channels into a [`GroupedPlaylist`]
#[derive(Debug, Default)]
pub struct ChannelGrouper {
    playlist: GroupedPlaylist,
    seen_urls: HashSet<String>,
    accepted: usize,
    duplicates: usize,
}

impl ChannelGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one triple. Returns `false` when its URL was already seen.
    pub fn accept(&mut self, channel: ParsedChannel) -> bool {
        if self.seen_urls.contains(&channel.stream_url) {
            self.duplicates += 1;
            debug!(
                "Skipping duplicate stream URL '{}' ({})",
                channel.stream_url, channel.display_name
            );
            return false;
        }
        self.seen_urls.insert(channel.stream_url.clone());
        let (group_key, entry) = channel.into_entry();
        self.playlist.push(group_key, entry);
        self.accepted += 1;
        true
    }

    pub fn extend<I>(&mut self, channels: I)
    where
        I: IntoIterator<Item = ParsedChannel>,
    {
        for channel in channels {
            self.accept(channel);
        }
    }

    /// Number of distinct channels accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finish(self) -> GroupedPlaylist {
        self.playlist
    }
}
