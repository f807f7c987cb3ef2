use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::config::FetchConfig;
use crate::errors::{AppError, AppResult, FetchError, FetchResult};
use crate::utils::UrlUtils;

/// Retrieves a remote resource as raw bytes
///
/// The seam between the fetcher and the network; tests substitute their own
/// implementation to simulate failures.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> FetchResult<Bytes>;
}

/// reqwest-backed client with a per-request deadline
#[derive(Debug, Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    pub fn new(config: &FetchConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for StandardHttpClient {
    async fn fetch_bytes(&self, url: &str) -> FetchResult<Bytes> {
        debug!("Fetching {}", UrlUtils::obfuscate_credentials(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        debug!(
            "Fetched {} bytes from {}",
            bytes.len(),
            UrlUtils::obfuscate_credentials(url)
        );
        Ok(bytes)
    }
}
