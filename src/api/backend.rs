use crate::api::types::{ErrorBody, SearchTokenResponse, Tweet, TweetsResponse, VolumeResponse};
use crate::api::{ActivitySource, TokenLookup};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::utils::Cache;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

const UNKNOWN_ERROR: &str = "Unknown error";
const MISSING_DETAIL: &str = "Failed to fetch token data";

/// Client for the scanner backend: address search, aggregated tweet volume
/// and raw tweet timestamps.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    search_cache: Cache<SearchTokenResponse>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::ConfigError(format!("invalid backend url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!("backend url cannot be a base: {}", base_url)));
        }
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url,
            search_cache: Cache::new(config.cache_ttl()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                Error::ApiInvalidFormat(format!("Failed to parse response from {}: {}", url, e))
            });
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail.unwrap_or_else(|| MISSING_DETAIL.to_string()),
            Err(_) => UNKNOWN_ERROR.to_string(),
        };
        warn!("{} returned {}: {}", url, status, detail);
        Err(Error::ApiStatus {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl TokenLookup for BackendClient {
    async fn search_token(&self, input: &str) -> Result<SearchTokenResponse> {
        if let Some(cached) = self.search_cache.get(input).await {
            info!("Using cached token info for: {}", input);
            return Ok(cached);
        }

        let token: SearchTokenResponse = self.get_json(&["search-token", input]).await?;
        self.search_cache.set(input.to_string(), token.clone()).await;
        Ok(token)
    }
}

#[async_trait]
impl ActivitySource for BackendClient {
    async fn volume(&self, symbol: &str) -> Result<VolumeResponse> {
        self.get_json(&["volume", symbol]).await
    }

    async fn tweets(&self, symbol: &str) -> Result<Vec<Tweet>> {
        let response: TweetsResponse = self.get_json(&["tweets", symbol]).await?;
        Ok(response.tweets)
    }
}
