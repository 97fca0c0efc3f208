use crate::error::Result;
use crate::models::TokenCandidate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod backend;
pub mod supabase;
pub mod types;

pub use backend::BackendClient;
pub use supabase::SupabaseClient;
pub use types::{SearchTokenResponse, Tweet, VolumeResponse};

/// Address lookup for tokens that are not in the local candidate list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenLookup: Send + Sync {
    async fn search_token(&self, input: &str) -> Result<SearchTokenResponse>;
}

/// The hosted token/tweet database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenDirectory: Send + Sync {
    /// All tokens currently flagged active.
    async fn active_tokens(&self) -> Result<Vec<TokenCandidate>>;

    /// `None` when the symbol is unknown, otherwise its active flag.
    async fn token_status(&self, symbol: &str) -> Result<Option<bool>>;

    async fn recent_tweets(&self, symbol: &str, since: DateTime<Utc>) -> Result<Vec<Tweet>>;

    /// Symbols with the most tweets over the last `hours`, busiest first.
    async fn top_active_tokens(&self, hours: u32, limit: usize) -> Result<Vec<String>>;
}

/// Tweet activity served by the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn volume(&self, symbol: &str) -> Result<VolumeResponse>;

    async fn tweets(&self, symbol: &str) -> Result<Vec<Tweet>>;
}
