#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::Path;
use token_scanner::api::{ActivitySource, TokenDirectory, Tweet, VolumeResponse};
use token_scanner::config::{Config, StorageConfig};
use token_scanner::error::{Error, Result};
use token_scanner::models::TokenCandidate;

pub fn create_test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.backend.base_url = "http://127.0.0.1:9".to_string();
    config.database.url = "http://127.0.0.1:9".to_string();
    config.database.anon_key = "test-anon-key".to_string();
    config.storage = StorageConfig {
        data_dir: data_dir.to_path_buf(),
    };
    config
}

/// In-memory token database: each symbol maps to its active flag and the
/// ages of its tweets in hours.
#[derive(Debug, Default)]
pub struct StubDirectory {
    tokens: HashMap<String, (bool, Vec<i64>)>,
    trending: Vec<String>,
}

impl StubDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, symbol: &str, active: bool, tweet_ages: &[i64]) -> Self {
        self.tokens
            .insert(symbol.to_lowercase(), (active, tweet_ages.to_vec()));
        self
    }

    pub fn trending(mut self, symbols: &[&str]) -> Self {
        self.trending = symbols.iter().map(|s| s.to_string()).collect();
        self
    }
}

#[async_trait]
impl TokenDirectory for StubDirectory {
    async fn active_tokens(&self) -> Result<Vec<TokenCandidate>> {
        Ok(self
            .tokens
            .iter()
            .filter(|(_, (active, _))| *active)
            .map(|(symbol, _)| TokenCandidate::new(symbol, symbol, &format!("{}-address", symbol)))
            .collect())
    }

    async fn token_status(&self, symbol: &str) -> Result<Option<bool>> {
        Ok(self.tokens.get(symbol).map(|(active, _)| *active))
    }

    async fn recent_tweets(&self, symbol: &str, since: DateTime<Utc>) -> Result<Vec<Tweet>> {
        let now = Utc::now();
        Ok(self
            .tokens
            .get(symbol)
            .map(|(_, ages)| {
                ages.iter()
                    .map(|h| Tweet {
                        created_at: now - Duration::hours(*h),
                    })
                    .filter(|tweet| tweet.created_at >= since)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn top_active_tokens(&self, _hours: u32, limit: usize) -> Result<Vec<String>> {
        Ok(self.trending.iter().take(limit).cloned().collect())
    }
}

/// Backend that knows aggregated volume for a few symbols and nothing else.
#[derive(Debug, Default)]
pub struct StubBackend {
    volumes: HashMap<String, VolumeResponse>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(mut self, symbol: &str, total: u64, last_hour: u64) -> Self {
        let mut buckets = HashMap::new();
        buckets.insert((Utc::now() - Duration::minutes(20)).to_rfc3339(), last_hour);
        self.volumes
            .insert(symbol.to_lowercase(), VolumeResponse { total, buckets });
        self
    }
}

#[async_trait]
impl ActivitySource for StubBackend {
    async fn volume(&self, symbol: &str) -> Result<VolumeResponse> {
        self.volumes.get(symbol).cloned().ok_or_else(|| Error::ApiStatus {
            status: 404,
            detail: "Token not indexed".to_string(),
        })
    }

    async fn tweets(&self, _symbol: &str) -> Result<Vec<Tweet>> {
        Ok(Vec::new())
    }
}
