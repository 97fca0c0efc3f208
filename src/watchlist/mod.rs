//! The persisted, de-duplicated list of tracked tokens.

pub mod loading;
pub mod storage;

pub use loading::{LoadingGuard, LoadingSet};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

use crate::error::Result;
use crate::models::WatchlistEntry;
use log::{debug, error};
use std::sync::Arc;

pub const WATCHLIST_KEY: &str = "twitterScanWatchlist";

/// Ordered watchlist keyed by upper-cased symbol. Every effective mutation
/// rewrites the whole list to storage.
pub struct WatchlistStore {
    storage: Arc<dyn KeyValueStore>,
    entries: Vec<WatchlistEntry>,
}

impl std::fmt::Debug for WatchlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistStore")
            .field("storage", &format_args!("<KeyValueStore>"))
            .field("entries", &self.entries)
            .finish()
    }
}

impl WatchlistStore {
    /// Loads the persisted list. A value that does not parse is logged and
    /// treated as an empty list.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let entries = match storage.get(WATCHLIST_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<WatchlistEntry>>(&raw) {
                Ok(entries) => dedup(entries),
                Err(e) => {
                    error!("Invalid watchlist in storage, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        debug!("Loaded {} watchlist entries", entries.len());
        Ok(Self { storage, entries })
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        let symbol = symbol.to_uppercase();
        self.entries.iter().find(|entry| entry.token == symbol)
    }

    /// Appends `entry` unless its symbol is already tracked. Returns whether
    /// the list changed.
    pub fn add(&mut self, mut entry: WatchlistEntry) -> Result<bool> {
        entry.token = entry.token.to_uppercase();
        if self.contains(&entry.token) {
            debug!("{} is already on the watchlist", entry.token);
            return Ok(false);
        }
        let mut entries = self.entries.clone();
        entries.push(entry);
        self.commit(entries)?;
        Ok(true)
    }

    /// Removes the entry for `symbol`. Returns whether the list changed.
    pub fn remove(&mut self, symbol: &str) -> Result<bool> {
        let symbol = symbol.to_uppercase();
        if !self.contains(&symbol) {
            return Ok(false);
        }
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.token != symbol)
            .cloned()
            .collect();
        self.commit(entries)?;
        Ok(true)
    }

    /// Writes `entries` to storage and only then replaces the in-memory
    /// list, so a failed write leaves both unchanged.
    fn commit(&mut self, entries: Vec<WatchlistEntry>) -> Result<()> {
        let raw = serde_json::to_string(&entries)?;
        self.storage.set(WATCHLIST_KEY, &raw)?;
        self.entries = entries;
        Ok(())
    }
}

fn dedup(entries: Vec<WatchlistEntry>) -> Vec<WatchlistEntry> {
    let mut unique: Vec<WatchlistEntry> = Vec::with_capacity(entries.len());
    for mut entry in entries {
        entry.token = entry.token.to_uppercase();
        if !unique.iter().any(|existing| existing.token == entry.token) {
            unique.push(entry);
        }
    }
    unique
}
