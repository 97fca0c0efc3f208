//! Tweet-activity tracking for the watchlist.
//!
//! Tokens known to the database are bucketed from raw tweet timestamps.
//! Tokens the database has never seen go through the backend's aggregated
//! volume endpoint instead, whose reported total is kept as is.

use crate::activity::ACTIVITY_WINDOW_HOURS;
use crate::api::{ActivitySource, TokenDirectory, Tweet};
use crate::config::ScannerConfig;
use crate::error::{Error, Result};
use crate::models::{TokenCandidate, WatchlistEntry};
use crate::search::{SuggestionFilter, SuggestionList};
use crate::watchlist::{KeyValueStore, LoadingSet, WatchlistStore};
use chrono::{Duration, Utc};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Set once trending tokens were preloaded in the current session.
pub const TRENDING_LOADED_KEY: &str = "twitterScanTrendingLoaded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Added(WatchlistEntry),
    AlreadyTracked,
    AlreadyLoading,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub skipped: bool,
    pub added: Vec<String>,
    pub failed: Vec<String>,
}

pub struct ActivityScanner {
    directory: Arc<dyn TokenDirectory>,
    activity: Arc<dyn ActivitySource>,
    storage: Arc<dyn KeyValueStore>,
    watchlist: Mutex<WatchlistStore>,
    loading: LoadingSet,
    candidates: Mutex<Vec<TokenCandidate>>,
    filter: SuggestionFilter,
    config: ScannerConfig,
    active: AtomicBool,
}

impl std::fmt::Debug for ActivityScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityScanner")
            .field("loading", &self.loading)
            .field("config", &self.config)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl ActivityScanner {
    pub fn new(
        directory: Arc<dyn TokenDirectory>,
        activity: Arc<dyn ActivitySource>,
        storage: Arc<dyn KeyValueStore>,
        config: ScannerConfig,
    ) -> Result<Self> {
        let watchlist = WatchlistStore::load(storage.clone())?;
        Ok(Self {
            directory,
            activity,
            storage,
            watchlist: Mutex::new(watchlist),
            loading: LoadingSet::new(),
            candidates: Mutex::new(Vec::new()),
            filter: SuggestionFilter::default(),
            config,
            active: AtomicBool::new(true),
        })
    }

    /// Fetches the active tokens used for suggestions.
    pub async fn load_candidates(&self) -> Result<usize> {
        let tokens = self.directory.active_tokens().await?;
        let count = tokens.len();
        *self.candidates.lock().await = tokens;
        info!("Loaded {} active tokens", count);
        Ok(count)
    }

    pub async fn suggest(&self, query: &str) -> SuggestionList {
        let candidates = self.candidates.lock().await;
        self.filter.filter(&candidates, query)
    }

    pub async fn entries(&self) -> Vec<WatchlistEntry> {
        self.watchlist.lock().await.entries().to_vec()
    }

    pub async fn entry(&self, symbol: &str) -> Option<WatchlistEntry> {
        self.watchlist.lock().await.get(symbol).cloned()
    }

    pub fn loading(&self) -> &LoadingSet {
        &self.loading
    }

    pub async fn untrack(&self, symbol: &str) -> Result<bool> {
        self.watchlist.lock().await.remove(symbol)
    }

    /// Resolves `symbol`, fetches its activity and appends it to the
    /// watchlist.
    pub async fn track(&self, symbol: &str, preloaded: bool) -> Result<TrackOutcome> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(Error::InvalidInput("empty token symbol".to_string()));
        }
        if self.watchlist.lock().await.contains(&symbol) {
            return Ok(TrackOutcome::AlreadyTracked);
        }
        let Some(_loading) = self.loading.begin(&symbol) else {
            return Ok(TrackOutcome::AlreadyLoading);
        };

        let normalized = symbol.to_lowercase();
        let status = self
            .directory
            .token_status(&normalized)
            .await
            .map_err(|e| tracking_failed(&symbol, e))?;

        let entry = match status {
            None => self.entry_from_volume(&symbol, &normalized, preloaded).await?,
            Some(false) => return Err(Error::InactiveToken(symbol)),
            Some(true) => self.entry_from_tweets(&symbol, &normalized, preloaded).await?,
        };

        if !self.watchlist.lock().await.add(entry.clone())? {
            return Ok(TrackOutcome::AlreadyTracked);
        }
        info!("Tracking {} with {} tweets", entry.token, entry.total);
        Ok(TrackOutcome::Added(entry))
    }

    async fn entry_from_volume(&self, symbol: &str, normalized: &str, preloaded: bool) -> Result<WatchlistEntry> {
        let volume = match self.activity.volume(normalized).await {
            Ok(volume) => volume,
            Err(Error::ApiStatus { detail, .. }) => {
                return Err(Error::NotFound {
                    symbol: symbol.to_string(),
                    detail,
                })
            }
            Err(e) => return Err(tracking_failed(symbol, e)),
        };
        if volume.total == 0 {
            return Err(Error::NoActivity(symbol.to_string()));
        }
        Ok(WatchlistEntry::from_volume(symbol, &volume, Utc::now(), preloaded))
    }

    async fn entry_from_tweets(&self, symbol: &str, normalized: &str, preloaded: bool) -> Result<WatchlistEntry> {
        let since = Utc::now() - Duration::hours(ACTIVITY_WINDOW_HOURS);
        let mut tweets = match self.directory.recent_tweets(normalized, since).await {
            Ok(tweets) => tweets,
            Err(e) => {
                warn!("Database tweets unavailable for {}: {}", symbol, e);
                Vec::new()
            }
        };

        if tweets.is_empty() {
            tweets = match self.activity.tweets(normalized).await {
                Ok(tweets) => tweets,
                Err(Error::ApiStatus { status, detail }) => {
                    warn!("Fallback tweets for {} returned {}: {}", symbol, status, detail);
                    Vec::new()
                }
                Err(e) => return Err(tracking_failed(symbol, e)),
            };
        }

        if tweets.is_empty() {
            return Err(Error::NoActivity(symbol.to_string()));
        }
        let timestamps = tweets.into_iter().map(|tweet: Tweet| tweet.created_at);
        Ok(WatchlistEntry::from_tweets(symbol, timestamps, Utc::now(), preloaded))
    }

    /// Seeds an empty watchlist with the currently trending tokens, one at a
    /// time. Runs at most once per session.
    pub async fn preload_trending(&self) -> Result<PreloadReport> {
        let already_loaded = self.storage.get(TRENDING_LOADED_KEY)?.is_some();
        if !self.is_active() || already_loaded || !self.watchlist.lock().await.is_empty() {
            return Ok(PreloadReport {
                skipped: true,
                ..PreloadReport::default()
            });
        }

        let trending = self
            .directory
            .top_active_tokens(self.config.trending_hours, self.config.trending_limit)
            .await
            .map_err(|e| {
                error!("Failed to preload trending tokens: {}", e);
                e
            })?;

        let mut report = PreloadReport::default();
        for symbol in trending {
            if !self.is_active() {
                return Ok(report);
            }
            match self.track(&symbol, true).await {
                Ok(TrackOutcome::Added(entry)) => report.added.push(entry.token),
                Ok(_) => {}
                Err(e) => {
                    warn!("Skipping trending token {}: {}", symbol, e);
                    report.failed.push(symbol.to_uppercase());
                }
            }
        }

        self.storage.set(TRENDING_LOADED_KEY, "true")?;
        Ok(report)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Ends the session: stops any preload in progress and forgets that
    /// trending tokens were loaded.
    pub fn teardown(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        self.storage.remove(TRENDING_LOADED_KEY)
    }
}

fn tracking_failed(symbol: &str, err: Error) -> Error {
    error!("Token selection failed for {}: {}", symbol, err);
    Error::TrackingFailed {
        symbol: symbol.to_string(),
        reason: err.to_string(),
    }
}
