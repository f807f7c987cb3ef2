//! Category to acquisition/grouping behaviour table

use crate::config::SourcesConfig;
use crate::models::Category;
use crate::parser::GroupSource;

/// How the raw playlist text is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// One playlist fetched from a known URL
    Playlist { url: String },
    /// A listing endpoint enumerates files fetched from `raw_base_url`
    Directory {
        listing_url: String,
        raw_base_url: String,
        extension: String,
    },
}

/// How each channel's group key is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    /// `group-title` attribute of the `#EXTINF` line
    GroupTitle,
    /// First two characters of the source file name
    SourcePrefix,
}

/// Behaviour resolved for one category when the pipeline is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProfile {
    pub category: Category,
    pub acquisition: Acquisition,
    pub grouping: GroupingStrategy,
}

impl SourceProfile {
    pub fn resolve(category: Category, sources: &SourcesConfig) -> Self {
        let playlist = |url: &str| Acquisition::Playlist {
            url: url.to_string(),
        };
        let (acquisition, grouping) = match category {
            Category::Genre => (playlist(&sources.genre_url), GroupingStrategy::GroupTitle),
            Category::Language => (playlist(&sources.language_url), GroupingStrategy::GroupTitle),
            Category::Country => (playlist(&sources.country_url), GroupingStrategy::GroupTitle),
            Category::Streams => (
                Acquisition::Directory {
                    listing_url: sources.streams_listing_url.clone(),
                    raw_base_url: sources.streams_raw_url.clone(),
                    extension: sources.playlist_extension.clone(),
                },
                GroupingStrategy::SourcePrefix,
            ),
        };
        Self {
            category,
            acquisition,
            grouping,
        }
    }

    /// Group source for a fetched resource, `None` if no key can be derived
    pub fn group_source_for(&self, resource_name: &str) -> Option<GroupSource> {
        match self.grouping {
            GroupingStrategy::GroupTitle => Some(GroupSource::Attribute),
            GroupingStrategy::SourcePrefix => source_prefix(resource_name).map(GroupSource::Fixed),
        }
    }
}

/// First two characters of a file name, as written
pub fn source_prefix(resource_name: &str) -> Option<String> {
    let prefix: String = resource_name.chars().take(2).collect();
    (prefix.chars().count() == 2).then_some(prefix)
}
