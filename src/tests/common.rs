use crate::api::types::SearchTokenResponse;
use crate::api::TokenLookup;
use crate::error::{Error, Result};
use crate::models::{TokenCandidate, WatchlistEntry};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A 44 character address-like string starting with `prefix`.
pub fn address(prefix: &str) -> String {
    format!("{:1<44}", prefix)
}

pub fn candidate(symbol: &str, name: &str, address: &str) -> TokenCandidate {
    TokenCandidate::new(symbol, name, address)
}

/// Four tokens; three of them contain an "o" somewhere (bonk, popcat,
/// dogwifhat).
pub fn sample_candidates() -> Vec<TokenCandidate> {
    vec![
        candidate("bonk", "Bonk", &address("BNK")),
        candidate("popcat", "Popcat", &address("PPCT")),
        candidate("wif", "dogwifhat", &address("WF")),
        candidate("jup", "Jupiter", &address("JP")),
    ]
}

pub fn search_response(symbol: &str, address: &str) -> SearchTokenResponse {
    SearchTokenResponse {
        symbol: symbol.to_string(),
        token_name: format!("{} token", symbol),
        address: address.to_string(),
        age: None,
        market_cap: Some(1_000_000.0),
        volume_24h: None,
        liquidity: None,
        price_usd: None,
        dex_url: None,
        price_change_1h: None,
        image_url: None,
    }
}

pub fn hours_ago(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now - ChronoDuration::hours(hours)
}

pub fn test_entry(symbol: &str, total: u64) -> WatchlistEntry {
    let now = Utc::now();
    let tweets = (0..total).map(|i| now - ChronoDuration::minutes(i as i64 * 10));
    WatchlistEntry::from_tweets(symbol, tweets, now, false)
}

/// Lookup that answers each address after a fixed delay, so tests can
/// control which request finishes first.
#[derive(Debug, Default)]
pub struct ScriptedLookup {
    responses: HashMap<String, (String, Duration)>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, address: &str, symbol: &str, delay: Duration) -> Self {
        self.responses
            .insert(address.to_string(), (symbol.to_string(), delay));
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl TokenLookup for ScriptedLookup {
    async fn search_token(&self, input: &str) -> Result<SearchTokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((symbol, delay)) = self.responses.get(input) else {
            return Err(Error::ApiStatus {
                status: 404,
                detail: "Token not found".to_string(),
            });
        };
        tokio::time::sleep(*delay).await;
        Ok(search_response(symbol, input))
    }
}
