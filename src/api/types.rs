use crate::models::{TokenCandidate, WomScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `GET /search-token/{input}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTokenResponse {
    pub symbol: String,
    #[serde(rename = "token_name", default)]
    pub token_name: String,
    pub address: String,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(rename = "volume24h", default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<f64>,
    #[serde(default, deserialize_with = "price_as_string")]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub dex_url: Option<String>,
    #[serde(rename = "priceChange1h", default)]
    pub price_change_1h: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Prices arrive either as strings or bare numbers.
fn price_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Price>::deserialize(deserializer)?.map(|price| match price {
        Price::Text(text) => text,
        Price::Number(value) => value.to_string(),
    }))
}

impl SearchTokenResponse {
    /// Builds a candidate record for a token found by address. Missing market
    /// fields default to zero and the word-of-mouth score starts out pending.
    pub fn into_candidate(self) -> TokenCandidate {
        let empty_to_none = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        TokenCandidate {
            symbol: format!("${}", self.symbol.to_lowercase()),
            name: self.token_name,
            address: self.address,
            image_url: empty_to_none(self.image_url),
            market_cap_usd: self.market_cap.unwrap_or_default(),
            volume_usd: self.volume_24h.unwrap_or_default(),
            liquidity_usd: self.liquidity.unwrap_or_default(),
            price_change_1h: self.price_change_1h.unwrap_or_default(),
            price_usd: empty_to_none(self.price_usd),
            dex_url: empty_to_none(self.dex_url)
                .unwrap_or_else(|| crate::models::token::PLACEHOLDER_DEX_URL.to_string()),
            age: Some(
                empty_to_none(self.age)
                    .unwrap_or_else(|| crate::models::token::UNKNOWN_AGE.to_string()),
            ),
            wom_score: Some(WomScore::Calculating),
        }
    }
}

/// Body of `GET /volume/{symbol}`: total tweets plus counts keyed by
/// hour-aligned ISO timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub buckets: HashMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /tweets/{symbol}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweetsResponse {
    #[serde(default)]
    pub tweets: Vec<Tweet>,
}

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
}
