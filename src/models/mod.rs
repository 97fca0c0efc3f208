pub mod token;
pub mod watchlist;

pub use token::{format_market_cap, ResolvedToken, ScoreBand, TokenCandidate, TokenSource, WomScore};
pub use watchlist::WatchlistEntry;
