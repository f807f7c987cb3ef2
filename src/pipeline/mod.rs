//! Playlist pipeline: fetch, parse, group and cache one category
//!
//! A run moves linearly through [`PipelineStage`]; partial failures inside a
//! stage never end the run early. See [`PlaylistPipeline::run`].

use serde::Serialize;
use strum::Display;

pub mod orchestrator;

pub use orchestrator::PlaylistPipeline;

use crate::models::{Category, GroupSummary, GroupedPlaylist};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Discovering,
    Fetching,
    Parsing,
    Grouping,
    CacheWriting,
    Done,
}

/// Everything a host needs after a run has reached [`PipelineStage::Done`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub category: Category,
    pub playlist: GroupedPlaylist,
    /// Accepted (non-duplicate) channels across all groups
    pub channel_count: usize,
    /// Populated group keys in insertion order
    pub group_keys: Vec<String>,
    pub from_cache: bool,
    pub resources_attempted: usize,
    pub resources_fetched: usize,
}

impl PipelineOutput {
    pub(crate) fn new(
        category: Category,
        playlist: GroupedPlaylist,
        from_cache: bool,
        resources_attempted: usize,
        resources_fetched: usize,
    ) -> Self {
        Self {
            category,
            channel_count: playlist.channel_count(),
            group_keys: playlist.group_keys().map(str::to_string).collect(),
            playlist,
            from_cache,
            resources_attempted,
            resources_fetched,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channel_count == 0
    }

    /// Group labels and counts in presentation order
    pub fn summary<L>(&self, label: L) -> Vec<GroupSummary>
    where
        L: Fn(&str) -> String,
    {
        self.playlist.summary(label)
    }
}
