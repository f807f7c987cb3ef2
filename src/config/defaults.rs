//! Configuration default values

use std::time::Duration;

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(2500);

// Cache defaults
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_CACHE_FILE_NAME: &str = "iptv-playlists.cache";
pub const DEFAULT_CACHE_ENABLED: bool = true;

// Scratch space
pub const DEFAULT_SCRATCH_PREFIX: &str = "iptv-playlists-";

// iptv-org endpoints
pub const DEFAULT_GENRE_URL: &str = "https://iptv-org.github.io/iptv/index.category.m3u";
pub const DEFAULT_LANGUAGE_URL: &str = "https://iptv-org.github.io/iptv/index.language.m3u";
pub const DEFAULT_COUNTRY_URL: &str = "https://iptv-org.github.io/iptv/index.country.m3u";
pub const DEFAULT_STREAMS_LISTING_URL: &str =
    "https://api.github.com/repos/iptv-org/iptv/contents/streams";
pub const DEFAULT_STREAMS_RAW_URL: &str =
    "https://raw.githubusercontent.com/iptv-org/iptv/master/streams/";
pub const DEFAULT_PLAYLIST_EXTENSION: &str = ".m3u";

// Binary defaults
pub const DEFAULT_CONFIG_FILE: &str = "iptv-playlists.toml";
pub const CONFIG_ENV_PREFIX: &str = "IPTV_PLAYLISTS_";
