//! Grouped playlist data model
//!
//! `GroupedPlaylist` keeps groups and entries in discovery order. Any ordering a
//! host wants for display is computed on demand by [`GroupedPlaylist::presentation_order`]
//! and never written back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single channel: display name and stream URL.
///
/// Field order matters: the derived `Ord` sorts by name, then URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub display_name: String,
    pub stream_url: String,
}

impl ChannelEntry {
    pub fn new<N: Into<String>, U: Into<String>>(display_name: N, stream_url: U) -> Self {
        Self {
            display_name: display_name.into(),
            stream_url: stream_url.into(),
        }
    }
}

/// One `(name, group, url)` triple emitted by the line parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChannel {
    pub display_name: String,
    pub group_key: String,
    pub stream_url: String,
}

impl ParsedChannel {
    pub fn into_entry(self) -> (String, ChannelEntry) {
        (
            self.group_key,
            ChannelEntry {
                display_name: self.display_name,
                stream_url: self.stream_url,
            },
        )
    }
}

/// Group key to ordered channel list, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedPlaylist {
    groups: IndexMap<String, Vec<ChannelEntry>>,
}

/// A group in display order with its entries sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedGroup<'a> {
    pub key: &'a str,
    pub label: String,
    pub entries: Vec<&'a ChannelEntry>,
}

/// Group name and channel count, used to build selection menus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub label: String,
    pub count: usize,
}

impl GroupedPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `group_key`, creating the group on first use.
    ///
    /// Only the grouper calls this; deduplication is its responsibility.
    pub(crate) fn push(&mut self, group_key: String, entry: ChannelEntry) {
        self.groups.entry(group_key).or_default().push(entry);
    }

    pub fn get(&self, group_key: &str) -> Option<&[ChannelEntry]> {
        self.groups.get(group_key).map(Vec::as_slice)
    }

    /// Group keys in insertion order
    pub fn group_keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ChannelEntry])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of entries across all groups
    pub fn channel_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Groups ordered by case-insensitive label, entries ordered by `(name, url)`.
    pub fn presentation_order<L>(&self, label_for: L) -> Vec<PresentedGroup<'_>>
    where
        L: Fn(&str) -> String,
    {
        let mut keyed: Vec<(String, PresentedGroup<'_>)> = self
            .groups
            .iter()
            .map(|(key, entries)| {
                let label = label_for(key);
                let mut entries: Vec<&ChannelEntry> = entries.iter().collect();
                entries.sort();
                (
                    label.to_lowercase(),
                    PresentedGroup {
                        key: key.as_str(),
                        label,
                        entries,
                    },
                )
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, group)| group).collect()
    }

    /// The caller-selected groups in presentation order, skipping empty ones.
    pub fn materialize<L, S>(&self, enabled: &[S], label: L) -> Vec<PresentedGroup<'_>>
    where
        L: Fn(&str) -> String,
        S: AsRef<str>,
    {
        self.presentation_order(label)
            .into_iter()
            .filter(|group| !group.entries.is_empty())
            .filter(|group| enabled.iter().any(|key| key.as_ref() == group.key))
            .collect()
    }

    /// Per-group counts in presentation order
    pub fn summary<L>(&self, label: L) -> Vec<GroupSummary>
    where
        L: Fn(&str) -> String,
    {
        self.presentation_order(label)
            .into_iter()
            .map(|group| GroupSummary {
                key: group.key.to_string(),
                label: group.label,
                count: group.entries.len(),
            })
            .collect()
    }
}

/// Label lookup that leaves unknown keys untouched
pub fn label_lookup(labels: &HashMap<String, String>) -> impl Fn(&str) -> String + '_ {
    move |key| labels.get(key).cloned().unwrap_or_else(|| key.to_string())
}
