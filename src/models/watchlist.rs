use crate::activity::IntervalCounts;
use crate::api::types::VolumeResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracked token with its bucketed tweet activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    /// Upper-cased symbol, unique within a watchlist.
    pub token: String,
    pub total: u64,
    pub intervals: IntervalCounts,
    /// Counts in chart order, mirrors `intervals`.
    pub history: Vec<u64>,
    #[serde(default)]
    pub preloaded: bool,
    /// Activity came from the aggregated volume endpoint rather than raw
    /// tweet timestamps.
    #[serde(default, alias = "isVolumeSearch")]
    pub is_external_lookup: bool,
}

impl WatchlistEntry {
    /// Builds an entry from raw tweet timestamps; the total is the number of
    /// tweets that fell inside the tracked window.
    pub fn from_tweets<I>(symbol: &str, tweets: I, now: DateTime<Utc>, preloaded: bool) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let intervals = IntervalCounts::from_events(tweets, now);
        Self {
            token: symbol.to_uppercase(),
            total: intervals.sum(),
            history: intervals.history(),
            intervals,
            preloaded,
            is_external_lookup: false,
        }
    }

    /// Builds an entry from the volume endpoint; the total is whatever the
    /// endpoint reported, which need not match the bucket sum.
    pub fn from_volume(symbol: &str, volume: &VolumeResponse, now: DateTime<Utc>, preloaded: bool) -> Self {
        let intervals = IntervalCounts::from_hourly(&volume.buckets, now);
        Self {
            token: symbol.to_uppercase(),
            total: volume.total,
            history: intervals.history(),
            intervals,
            preloaded,
            is_external_lookup: true,
        }
    }

    /// File name used when the entry's card is exported as an image.
    pub fn export_file_name(&self) -> String {
        format!("{}-twittercard.png", self.token)
    }
}
