//! Durable per-category playlist cache
//!
//! The store is a plain value owned by whoever runs the pipeline. Its lifecycle
//! is `open -> get/put* -> close`, and `close` only touches the disk when a
//! `put` happened during the session.
//!
//! On disk it is a single JSON document mapping each category to
//! `{ created_at, playlist }`. Writes go to a sibling temp file which is then
//! renamed over the cache file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::errors::{CacheError, CacheResult};
use crate::models::{Category, GroupedPlaylist};
use crate::utils::fs::{remove_if_exists, write_atomic};

/// One cached playlist and the moment it was stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub created_at: DateTime<Utc>,
    pub playlist: GroupedPlaylist,
}

impl CacheRecord {
    pub fn new(playlist: GroupedPlaylist) -> Self {
        Self {
            created_at: Utc::now(),
            playlist,
        }
    }

    /// Older than `ttl` at `now`. Records stamped in the future are never stale.
    pub fn is_stale_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.created_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

type CacheDocument = BTreeMap<Category, CacheRecord>;

#[derive(Debug)]
pub struct CacheStore {
    /// `None` for a disabled store
    path: Option<PathBuf>,
    ttl: Duration,
    records: CacheDocument,
    dirty: bool,
}

impl CacheStore {
    /// Load the cache file at `path`.
    ///
    /// A missing file is an empty cache. An unreadable or corrupt file is
    /// logged, removed and also treated as empty.
    pub async fn open<P: Into<PathBuf>>(path: P, ttl: Duration) -> Self {
        let path = path.into();
        let records = match Self::load(&path).await {
            Ok(records) => {
                debug!("Loaded {} cached playlists from {}", records.len(), path.display());
                records
            }
            Err(e) => {
                warn!("Ignoring cache file: {}", e);
                if let Err(remove_err) = remove_if_exists(&path).await {
                    warn!("Failed to remove cache file {}: {}", path.display(), remove_err);
                }
                CacheDocument::new()
            }
        };

        Self {
            path: Some(path),
            ttl,
            records,
            dirty: false,
        }
    }

    /// Open the configured cache file, or a disabled store
    pub async fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::open(&config.path, config.ttl).await
        } else {
            info!("Playlist cache disabled");
            Self::disabled()
        }
    }

    /// A store that never hits and never writes
    pub fn disabled() -> Self {
        Self {
            path: None,
            ttl: Duration::ZERO,
            records: CacheDocument::new(),
            dirty: false,
        }
    }

    async fn load(path: &Path) -> CacheResult<CacheDocument> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheDocument::new()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cached playlist for `category` if present and within the TTL.
    ///
    /// A stale record is dropped. When nothing was put this session the cache
    /// file is rewritten at once; otherwise the removal is written by `close`.
    pub async fn get(&mut self, category: Category) -> Option<GroupedPlaylist> {
        let record = self.records.get(&category)?;
        if !record.is_stale_at(Utc::now(), self.ttl) {
            debug!("Cache hit for {}", category);
            return Some(record.playlist.clone());
        }

        info!(
            "Cached {} playlist from {} is older than {}, discarding",
            category,
            record.created_at,
            humantime::format_duration(self.ttl)
        );
        self.records.remove(&category);
        if self.dirty {
            return None;
        }
        if let Err(e) = self.persist().await {
            warn!("Failed to drop stale {} record from cache: {}", category, e);
        }
        None
    }

    /// Store `playlist` for `category`, stamped now. Ignored by a disabled store.
    pub fn put(&mut self, category: Category, playlist: GroupedPlaylist) {
        if !self.is_enabled() {
            return;
        }
        debug!(
            "Caching {} playlist with {} channels",
            category,
            playlist.channel_count()
        );
        self.records.insert(category, CacheRecord::new(playlist));
        self.dirty = true;
    }

    /// End the session, writing the cache file only if something was put.
    ///
    /// Returns whether the file was written.
    pub async fn close(self) -> CacheResult<bool> {
        if !self.dirty {
            debug!("Cache unchanged, nothing to persist");
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Write all current records, or remove the file when there are none
    async fn persist(&self) -> CacheResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if self.records.is_empty() {
            return remove_if_exists(path).await.map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            });
        }

        let contents = serde_json::to_vec(&self.records)?;
        write_atomic(path, &contents)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("Persisted {} cached playlists to {}", self.records.len(), path.display());
        Ok(())
    }

    #[cfg(test)]
    fn insert_record(&mut self, category: Category, record: CacheRecord) {
        self.records.insert(category, record);
    }
}
