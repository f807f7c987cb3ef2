use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{PipelineOutput, PipelineStage};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::config::defaults::DEFAULT_SCRATCH_PREFIX;
use crate::errors::{AppError, AppResult};
use crate::grouping::ChannelGrouper;
use crate::models::{Category, ParsedChannel};
use crate::parser::{LossyLines, M3uLineParser};
use crate::sources::{Acquisition, PlaylistFetcher, SourceProfile};

/// A raw playlist downloaded into the scratch directory
#[derive(Debug, Clone)]
struct FetchedResource {
    name: String,
    path: PathBuf,
}

/// Runs the fetch/parse/group/cache sequence for one category.
///
/// One pipeline per category; the cache store is passed in by the caller so
/// several pipelines can share a session.
pub struct PlaylistPipeline {
    fetcher: PlaylistFetcher,
    profile: SourceProfile,
    scratch_root: PathBuf,
    stage: PipelineStage,
}

impl PlaylistPipeline {
    pub fn new(fetcher: PlaylistFetcher, profile: SourceProfile, scratch_root: PathBuf) -> Self {
        Self {
            fetcher,
            profile,
            scratch_root,
            stage: PipelineStage::Idle,
        }
    }

    pub fn from_config(config: &Config, category: Category) -> AppResult<Self> {
        Ok(Self::new(
            PlaylistFetcher::from_config(&config.fetch)?,
            SourceProfile::resolve(category, &config.sources),
            config.storage.scratch_root(),
        ))
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!("{} pipeline: {} -> {}", self.profile.category, self.stage, next);
        self.stage = next;
    }

    /// Produce the grouped playlist for this pipeline's category.
    ///
    /// A fresh cache record short-circuits the run. Otherwise the raw playlists
    /// are downloaded into a scratch directory that is removed before the
    /// result is cached. Failed downloads only shrink the result; the only
    /// errors returned are scratch directory failures and a panicked parse task.
    pub async fn run(&mut self, cache: &mut CacheStore) -> AppResult<PipelineOutput> {
        let category = self.profile.category;
        self.stage = PipelineStage::Idle;

        if let Some(playlist) = cache.get(category).await {
            info!(
                "Serving {} playlist from cache ({} channels)",
                category,
                playlist.channel_count()
            );
            self.advance(PipelineStage::Done);
            return Ok(PipelineOutput::new(category, playlist, true, 0, 0));
        }

        let scratch = tempfile::Builder::new()
            .prefix(DEFAULT_SCRATCH_PREFIX)
            .tempdir_in(&self.scratch_root)
            .map_err(|e| AppError::filesystem("create scratch directory", &self.scratch_root, e))?;
        debug!("Using scratch directory {}", scratch.path().display());

        let collected = self.collect(scratch.path()).await;

        let scratch_path = scratch.path().to_path_buf();
        let cleanup = scratch
            .close()
            .map_err(|e| AppError::filesystem("remove scratch directory", scratch_path, e));
        let (channels, attempted, fetched) = collected?;
        cleanup?;

        self.advance(PipelineStage::Grouping);
        let mut grouper = ChannelGrouper::new();
        grouper.extend(channels);
        debug!(
            "Grouped {} channels, discarded {} duplicate URLs",
            grouper.accepted(),
            grouper.duplicates()
        );
        let playlist = grouper.finish();

        self.advance(PipelineStage::CacheWriting);
        if playlist.is_empty() {
            debug!("No channels for {}, leaving cache untouched", category);
        } else {
            cache.put(category, playlist.clone());
        }

        self.advance(PipelineStage::Done);
        let output = PipelineOutput::new(category, playlist, false, attempted, fetched);
        info!(
            "{} pipeline finished: {} channels in {} groups ({}/{} resources fetched)",
            category,
            output.channel_count,
            output.group_keys.len(),
            fetched,
            attempted
        );
        Ok(output)
    }

    /// Download and parse everything for this category inside `scratch`.
    ///
    /// Returns the parsed triples in resource order, with the number of
    /// resources attempted and fetched.
    async fn collect(&mut self, scratch: &Path) -> AppResult<(Vec<ParsedChannel>, usize, usize)> {
        let (resources, attempted) = match self.profile.acquisition.clone() {
            Acquisition::Playlist { url } => {
                self.advance(PipelineStage::Fetching);
                let name = self.profile.category.to_string();
                let path = scratch.join(&name);
                let resources = match self.fetcher.fetch_to_file(&url, &path).await {
                    Ok(_) => vec![FetchedResource { name, path }],
                    Err(_) => Vec::new(),
                };
                (resources, 1)
            }
            Acquisition::Directory {
                listing_url,
                raw_base_url,
                extension,
            } => {
                self.advance(PipelineStage::Discovering);
                let names = self.fetcher.discover(&listing_url, &extension).await;

                self.advance(PipelineStage::Fetching);
                let outcomes = self.fetcher.fetch_directory(&raw_base_url, &names, scratch).await;
                let resources = outcomes
                    .into_iter()
                    .filter_map(|outcome| {
                        let name = outcome.name;
                        outcome.result.ok().map(|path| FetchedResource { name, path })
                    })
                    .collect();
                (resources, names.len())
            }
        };
        let fetched = resources.len();

        self.advance(PipelineStage::Parsing);
        let profile = self.profile.clone();
        let channels = tokio::task::spawn_blocking(move || parse_resources(&profile, &resources))
            .await
            .map_err(|e| AppError::internal(format!("Playlist parse task failed: {e}")))?;

        Ok((channels, attempted, fetched))
    }
}

/// Parse every resource in order, skipping ones that cannot be read or keyed
fn parse_resources(profile: &SourceProfile, resources: &[FetchedResource]) -> Vec<ParsedChannel> {
    let mut channels = Vec::new();
    for resource in resources {
        let Some(group_source) = profile.group_source_for(&resource.name) else {
            warn!("Cannot derive a group key from '{}', skipping", resource.name);
            continue;
        };
        let file = match File::open(&resource.path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open {}: {}", resource.path.display(), e);
                continue;
            }
        };

        let before = channels.len();
        channels.extend(M3uLineParser::new(
            LossyLines::new(BufReader::new(file)),
            group_source,
        ));
        debug!("Parsed {} channels from {}", channels.len() - before, resource.name);
    }
    channels
}
