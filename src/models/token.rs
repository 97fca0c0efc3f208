use serde::{Deserialize, Serialize};

/// Placeholder link used when a token has no DEX page.
pub const PLACEHOLDER_DEX_URL: &str = "#";
pub const UNKNOWN_AGE: &str = "unknown";
const CALCULATING_LABEL: &str = "Calculating...";

/// A token available for local matching.
///
/// `address` is the identity of the token; `symbol` and `name` are only used
/// for matching and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCandidate {
    #[serde(rename = "token_symbol", default)]
    pub symbol: String,
    #[serde(rename = "token_name", default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "nullable_number")]
    pub market_cap_usd: f64,
    #[serde(default, deserialize_with = "nullable_number")]
    pub volume_usd: f64,
    #[serde(default, deserialize_with = "nullable_number")]
    pub liquidity_usd: f64,
    #[serde(rename = "pricechange1h", default, deserialize_with = "nullable_number")]
    pub price_change_1h: f64,
    #[serde(rename = "priceUsd", default)]
    pub price_usd: Option<String>,
    #[serde(default = "default_dex_url")]
    pub dex_url: String,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub wom_score: Option<WomScore>,
}

fn default_dex_url() -> String {
    PLACEHOLDER_DEX_URL.to_string()
}

fn nullable_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

impl TokenCandidate {
    pub fn new(symbol: &str, name: &str, address: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            image_url: None,
            market_cap_usd: 0.0,
            volume_usd: 0.0,
            liquidity_usd: 0.0,
            price_change_1h: 0.0,
            price_usd: None,
            dex_url: default_dex_url(),
            age: None,
            wom_score: None,
        }
    }

    /// Case-insensitive exact match on symbol, name or address.
    /// `needle` must already be lower case.
    pub fn matches_exactly(&self, needle: &str) -> bool {
        self.symbol.to_lowercase() == needle
            || self.name.to_lowercase() == needle
            || self.address.to_lowercase() == needle
    }

    /// Case-insensitive substring match on symbol, name or address.
    /// `needle` must already be lower case.
    pub fn contains(&self, needle: &str) -> bool {
        self.symbol.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.address.to_lowercase().contains(needle)
    }

    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }
}

/// Word-of-mouth score: a value in [0, 100], or still being computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWomScore", into = "RawWomScore")]
pub enum WomScore {
    Score(f64),
    Calculating,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawWomScore {
    Number(f64),
    Text(String),
}

impl From<RawWomScore> for WomScore {
    fn from(raw: RawWomScore) -> Self {
        match raw {
            RawWomScore::Number(value) => WomScore::score(value),
            RawWomScore::Text(_) => WomScore::Calculating,
        }
    }
}

impl From<WomScore> for RawWomScore {
    fn from(score: WomScore) -> Self {
        match score {
            WomScore::Score(value) => RawWomScore::Number(value),
            WomScore::Calculating => RawWomScore::Text(CALCULATING_LABEL.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl WomScore {
    pub fn score(value: f64) -> Self {
        if value.is_finite() {
            WomScore::Score(value.clamp(0.0, 100.0))
        } else {
            WomScore::Score(0.0)
        }
    }

    pub fn band(&self) -> Option<ScoreBand> {
        match self {
            WomScore::Score(value) if *value >= 49.0 => Some(ScoreBand::Strong),
            WomScore::Score(value) if *value >= 25.0 => Some(ScoreBand::Moderate),
            WomScore::Score(_) => Some(ScoreBand::Weak),
            WomScore::Calculating => None,
        }
    }
}

impl std::fmt::Display for WomScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WomScore::Score(value) => write!(f, "{:.1}/100", value),
            WomScore::Calculating => write!(f, "{}", CALCULATING_LABEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Found in the locally held candidate list.
    Local,
    /// Built from an external address lookup.
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedToken {
    pub token: TokenCandidate,
    pub source: TokenSource,
}

impl ResolvedToken {
    pub fn local(token: TokenCandidate) -> Self {
        Self {
            token,
            source: TokenSource::Local,
        }
    }

    pub fn external(token: TokenCandidate) -> Self {
        Self {
            token,
            source: TokenSource::External,
        }
    }
}

/// Compact market cap label, e.g. `$1.5M`.
pub fn format_market_cap(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "N/A".to_string();
    }
    if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${:.2}", value)
    }
}
