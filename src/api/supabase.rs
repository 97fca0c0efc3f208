use crate::api::types::Tweet;
use crate::api::TokenDirectory;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::models::TokenCandidate;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

const TOKEN_COLUMNS: &str = "token_symbol,token_name,address,image_url,market_cap_usd,volume_usd,\
liquidity_usd,pricechange1h,dex_url,age,wom_score";

#[derive(Debug, Deserialize)]
struct StatusRow {
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SymbolRow {
    token_symbol: String,
}

/// Read-only access to the `tokens` and `tweets` tables through the
/// database's REST interface.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    rest_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(Error::ConfigError("database url is not set".to_string()));
        }
        let rest_url = Url::parse(&config.url)
            .and_then(|url| url.join("rest/v1/"))
            .map_err(|e| Error::ConfigError(format!("invalid database url: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            rest_url,
            anon_key: config.anon_key.clone(),
        })
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, params: &[(&str, String)]) -> Result<Vec<T>> {
        let url = self
            .rest_url
            .join(table)
            .map_err(|e| Error::ConfigError(format!("invalid table {}: {}", table, e)))?;
        debug!("Querying {} with {:?}", table, params);

        let response = self
            .client
            .get(url)
            .query(params)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await
            .map_err(|e| Error::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Query on {} failed with {}: {}", table, status, detail);
            return Err(Error::ApiStatus {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| Error::ApiInvalidFormat(format!("Failed to parse {} rows: {}", table, e)))
    }
}

fn timestamp_filter(since: DateTime<Utc>) -> String {
    format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Orders symbols by descending count, ties by symbol.
pub(crate) fn rank_by_count(symbols: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for symbol in symbols {
        *counts.entry(symbol).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(symbol, _)| symbol).collect()
}

#[async_trait]
impl TokenDirectory for SupabaseClient {
    async fn active_tokens(&self) -> Result<Vec<TokenCandidate>> {
        self.select(
            "tokens",
            &[
                ("select", TOKEN_COLUMNS.to_string()),
                ("is_active", "eq.true".to_string()),
            ],
        )
        .await
    }

    async fn token_status(&self, symbol: &str) -> Result<Option<bool>> {
        let rows: Vec<StatusRow> = self
            .select(
                "tokens",
                &[
                    ("select", "is_active".to_string()),
                    ("token_symbol", format!("eq.{}", symbol)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.is_active.unwrap_or(false)))
    }

    async fn recent_tweets(&self, symbol: &str, since: DateTime<Utc>) -> Result<Vec<Tweet>> {
        self.select(
            "tweets",
            &[
                ("select", "created_at".to_string()),
                ("token_symbol", format!("eq.{}", symbol)),
                ("created_at", timestamp_filter(since)),
            ],
        )
        .await
    }

    async fn top_active_tokens(&self, hours: u32, limit: usize) -> Result<Vec<String>> {
        let since = Utc::now() - Duration::hours(i64::from(hours));
        let rows: Vec<SymbolRow> = self
            .select(
                "tweets",
                &[
                    ("select", "token_symbol".to_string()),
                    ("created_at", timestamp_filter(since)),
                ],
            )
            .await?;
        Ok(rank_by_count(rows.into_iter().map(|row| row.token_symbol), limit))
    }
}
