//! Playlist download in single-playlist and directory mode
//!
//! Every per-resource failure is logged here and returned as a typed
//! [`FetchError`]; nothing below this boundary aborts sibling downloads or the
//! pipeline.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::http_client::{HttpFetch, StandardHttpClient};
use crate::config::FetchConfig;
use crate::errors::{AppResult, FetchError, FetchResult};
use crate::utils::UrlUtils;
use crate::utils::fs::write_atomic;

/// One record of the directory listing endpoint
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ListingEntry {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Result of downloading one listed file
#[derive(Debug)]
pub struct FetchOutcome {
    pub name: String,
    pub url: String,
    pub result: FetchResult<PathBuf>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Names of plain files ending in `extension`, in listing order
pub fn select_playlist_files(entries: &[ListingEntry], extension: &str) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| entry.is_file() && entry.name.ends_with(extension))
        .map(|entry| entry.name.clone())
        .collect()
}

#[derive(Clone)]
pub struct PlaylistFetcher {
    client: Arc<dyn HttpFetch>,
}

impl PlaylistFetcher {
    pub fn new(client: Arc<dyn HttpFetch>) -> Self {
        Self { client }
    }

    pub fn from_config(config: &FetchConfig) -> AppResult<Self> {
        Ok(Self::new(Arc::new(StandardHttpClient::new(config)?)))
    }

    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// The body is staged in a temp sibling and renamed over `dest` once fully
    /// written, so a failed fetch never leaves or alters a local file.
    pub async fn fetch_to_file(&self, url: &str, dest: &Path) -> FetchResult<u64> {
        let result = self.try_fetch_to_file(url, dest).await;
        if let Err(e) = &result {
            warn!("Failed to download {}: {}", UrlUtils::obfuscate_credentials(url), e);
        }
        result
    }

    async fn try_fetch_to_file(&self, url: &str, dest: &Path) -> FetchResult<u64> {
        let body = self.client.fetch_bytes(url).await?;
        write_atomic(dest, &body)
            .await
            .map_err(|source| FetchError::Io {
                url: url.to_string(),
                path: dest.to_path_buf(),
                source,
            })?;
        debug!("Stored {} bytes at {}", body.len(), dest.display());
        Ok(body.len() as u64)
    }

    /// Names of playlist files listed at `listing_url`.
    ///
    /// Network and decode failures are logged and give an empty list.
    pub async fn discover(&self, listing_url: &str, extension: &str) -> Vec<String> {
        match self.try_discover(listing_url, extension).await {
            Ok(names) => {
                info!(
                    "Discovered {} playlist files at {}",
                    names.len(),
                    UrlUtils::obfuscate_credentials(listing_url)
                );
                names
            }
            Err(e) => {
                warn!("Playlist discovery failed: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_discover(&self, listing_url: &str, extension: &str) -> FetchResult<Vec<String>> {
        let body = self.client.fetch_bytes(listing_url).await?;
        let entries: Vec<ListingEntry> =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                url: listing_url.to_string(),
                message: e.to_string(),
            })?;
        Ok(select_playlist_files(&entries, extension))
    }

    /// Download every named file from `raw_base_url` into `dest_dir` concurrently.
    ///
    /// One task per file, all started at once; returns after every task has
    /// finished. Outcomes are in the order of `names`, not completion order.
    pub async fn fetch_directory(
        &self,
        raw_base_url: &str,
        names: &[String],
        dest_dir: &Path,
    ) -> Vec<FetchOutcome> {
        let mut slots: Vec<Option<FetchResult<PathBuf>>> = (0..names.len()).map(|_| None).collect();
        let mut urls = Vec::with_capacity(names.len());
        let mut tasks = JoinSet::new();

        for (index, name) in names.iter().enumerate() {
            let url = match UrlUtils::join_file(raw_base_url, name) {
                Ok(url) => url,
                Err(e) => {
                    let url = format!("{raw_base_url}{name}");
                    warn!("Cannot build download URL for '{}': {}", name, e);
                    slots[index] = Some(Err(FetchError::InvalidUrl {
                        url: url.clone(),
                        message: e.to_string(),
                    }));
                    urls.push(url);
                    continue;
                }
            };
            urls.push(url.clone());

            let Some(file_name) = Path::new(name).file_name() else {
                slots[index] = Some(Err(FetchError::InvalidUrl {
                    url,
                    message: format!("'{name}' has no file name"),
                }));
                continue;
            };
            let dest = dest_dir.join(file_name);
            let fetcher = self.clone();
            tasks.spawn(async move {
                let result = fetcher.fetch_to_file(&url, &dest).await;
                (index, result.map(|_| dest))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("Playlist download task failed: {}", e),
            }
        }

        let outcomes: Vec<FetchOutcome> = names
            .iter()
            .zip(urls)
            .zip(slots)
            .map(|((name, url), slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(FetchError::Network {
                        url: url.clone(),
                        message: "download task did not complete".to_string(),
                    })
                });
                FetchOutcome {
                    name: name.clone(),
                    url,
                    result,
                }
            })
            .collect();

        let fetched = outcomes.iter().filter(|o| o.is_success()).count();
        info!("Downloaded {}/{} playlist files", fetched, outcomes.len());
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Serves canned bodies; unknown URLs fail with a network error
    struct StubClient {
        bodies: HashMap<String, (Duration, &'static str)>,
        panic_on: Option<&'static str>,
    }

    #[async_trait]
    impl HttpFetch for StubClient {
        async fn fetch_bytes(&self, url: &str) -> FetchResult<Bytes> {
            if self.panic_on.is_some_and(|name| url.ends_with(name)) {
                panic!("stub client asked to fail on {url}");
            }
            match self.bodies.get(url) {
                Some((delay, body)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(Bytes::from_static(body.as_bytes()))
                }
                None => Err(FetchError::Network {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    fn fetcher(bodies: &[(&str, u64, &'static str)]) -> PlaylistFetcher {
        fetcher_panicking_on(bodies, None)
    }

    fn fetcher_panicking_on(
        bodies: &[(&str, u64, &'static str)],
        panic_on: Option<&'static str>,
    ) -> PlaylistFetcher {
        let bodies = bodies
            .iter()
            .map(|(url, delay, body)| (url.to_string(), (Duration::from_millis(*delay), *body)))
            .collect();
        PlaylistFetcher::new(Arc::new(StubClient { bodies, panic_on }))
    }

    fn entry(name: &str, kind: &str) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn test_select_playlist_files() {
        let entries = vec![
            entry("us.m3u", "file"),
            entry("notes.txt", "file"),
            entry("ca", "dir"),
        ];
        assert_eq!(select_playlist_files(&entries, ".m3u"), vec!["us.m3u"]);
    }

    #[test]
    fn test_listing_entry_ignores_extra_fields() {
        let json = r#"[{"name":"us.m3u","path":"streams/us.m3u","sha":"abc","size":10,"type":"file"}]"#;
        let entries: Vec<ListingEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries, vec![entry("us.m3u", "file")]);
    }

    #[tokio::test]
    async fn test_discover_returns_empty_on_failure() {
        let fetcher = fetcher(&[("http://listing/bad", 0, "not json")]);
        assert!(fetcher.discover("http://listing/missing", ".m3u").await.is_empty());
        assert!(fetcher.discover("http://listing/bad", ".m3u").await.is_empty());
        assert!(matches!(
            fetcher.try_discover("http://listing/bad", ".m3u").await,
            Err(FetchError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_to_file_does_not_touch_dest_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("genre");
        std::fs::write(&dest, "previous").unwrap();

        let fetcher = fetcher(&[]);
        assert!(fetcher.fetch_to_file("http://host/genre.m3u", &dest).await.is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "previous");
    }

    #[tokio::test]
    async fn test_fetch_to_file_writes_body_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("genre");
        let fetcher = fetcher(&[("http://host/genre.m3u", 0, "#EXTM3U\r\nbody")]);

        let written = fetcher.fetch_to_file("http://host/genre.m3u", &dest).await.unwrap();
        assert_eq!(written, 13);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "#EXTM3U\r\nbody");
    }

    #[tokio::test]
    async fn test_fetch_directory_isolates_failures_and_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        // the first file finishes last
        let fetcher = fetcher(&[
            ("http://raw/streams/ca.m3u", 150, "ca"),
            ("http://raw/streams/us.m3u", 0, "us"),
        ]);
        let names = vec!["ca.m3u".to_string(), "de.m3u".to_string(), "us.m3u".to_string()];

        let outcomes = fetcher
            .fetch_directory("http://raw/streams", &names, temp_dir.path())
            .await;

        let summary: Vec<(&str, bool)> = outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.is_success()))
            .collect();
        assert_eq!(summary, vec![("ca.m3u", true), ("de.m3u", false), ("us.m3u", true)]);
        assert_eq!(outcomes[1].url, "http://raw/streams/de.m3u");
        assert!(!temp_dir.path().join("de.m3u").exists());

        let ca_path = outcomes[0].result.as_ref().unwrap();
        assert_eq!(std::fs::read_to_string(ca_path).unwrap(), "ca");
    }

    #[tokio::test]
    async fn test_fetch_directory_with_no_names() {
        let temp_dir = TempDir::new().unwrap();
        let outcomes = fetcher(&[])
            .fetch_directory("http://raw/streams", &[], temp_dir.path())
            .await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_to_file_failed_write_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        // a non-empty directory at `dest` makes the final rename fail
        let dest = temp_dir.path().join("genre");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep"), "x").unwrap();

        let fetcher = fetcher(&[("http://host/genre.m3u", 0, "#EXTM3U\n")]);
        let result = fetcher.fetch_to_file("http://host/genre.m3u", &dest).await;

        assert!(matches!(result, Err(FetchError::Io { .. })), "got {result:?}");
        assert!(dest.join("keep").exists());
        assert!(!crate::utils::fs::temp_sibling(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_directory_counts_panicked_task_as_failure() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = fetcher_panicking_on(
            &[
                ("http://raw/streams/a.m3u", 0, "a"),
                ("http://raw/streams/boom.m3u", 0, "never"),
                ("http://raw/streams/b.m3u", 0, "b"),
            ],
            Some("boom.m3u"),
        );
        let names = vec!["a.m3u".to_string(), "boom.m3u".to_string(), "b.m3u".to_string()];

        let outcomes = fetcher
            .fetch_directory("http://raw/streams", &names, temp_dir.path())
            .await;

        let summary: Vec<(&str, bool)> = outcomes
            .iter()
            .map(|o| (o.name.as_str(), o.is_success()))
            .collect();
        assert_eq!(summary, vec![("a.m3u", true), ("boom.m3u", false), ("b.m3u", true)]);
        assert!(matches!(outcomes[1].result, Err(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_fetch_directory_runs_downloads_concurrently() {
        let temp_dir = TempDir::new().unwrap();
        let names: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| format!("{n}.m3u"))
            .collect();
        let urls: Vec<String> = names
            .iter()
            .map(|n| format!("http://raw/streams/{n}"))
            .collect();
        let bodies: Vec<(&str, u64, &'static str)> =
            urls.iter().map(|url| (url.as_str(), 300, "body")).collect();
        let fetcher = fetcher(&bodies);

        let started = std::time::Instant::now();
        let outcomes = fetcher
            .fetch_directory("http://raw/streams", &names, temp_dir.path())
            .await;
        let elapsed = started.elapsed();

        assert!(outcomes.iter().all(FetchOutcome::is_success));
        // five 300ms downloads in sequence would take 1.5s
        assert!(elapsed < Duration::from_millis(1000), "took {elapsed:?}");
    }
}
