use std::io;
use std::result::Result as StdResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API request failed with status {status}: {detail}")]
    ApiStatus { status: u16, detail: String },
    #[error("API invalid format: {0}")]
    ApiInvalidFormat(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Token \"{symbol}\" not found: {detail}")]
    NotFound { symbol: String, detail: String },
    #[error("Token \"{0}\" is currently inactive.")]
    InactiveToken(String),
    #[error("No tweet data found for token \"{0}\".")]
    NoActivity(String),
    #[error("Failed to fetch data for token \"{symbol}\". Please try again. ({reason})")]
    TrackingFailed { symbol: String, reason: String },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl Error {
    /// Failures of the transport itself, as opposed to answers from a service.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::NetworkError(_) | Error::HttpError(_) | Error::ApiInvalidFormat(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ApiInvalidFormat(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;
