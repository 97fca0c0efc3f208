//! Turns free-text input into a concrete token.
//!
//! Local candidates are matched first. Only input shaped like a contract
//! address is sent to the external lookup; other misses leave the resolver
//! waiting for the user to paste an address. Every external request is
//! tagged with a generation number and its result is dropped if another
//! resolution (or a `clear`) started in the meantime.

use crate::api::TokenLookup;
use crate::error::Result;
use crate::models::{ResolvedToken, TokenCandidate};
use crate::search::{available_candidates, SuggestionFilter, SuggestionList};
use log::{debug, error, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Inputs at least this long are treated as contract addresses.
pub const ADDRESS_MIN_LEN: usize = 30;

pub fn is_probably_address(input: &str) -> bool {
    input.chars().count() >= ADDRESS_MIN_LEN
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedToken),
    /// A symbol-like query missed the local list; the user has to supply an
    /// address instead.
    WaitingForAddress { symbol: String },
    /// A newer request superseded this one; nothing was applied.
    Stale,
    /// Nothing to resolve.
    Idle,
}

/// Snapshot of the search box for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub suggestions: SuggestionList,
    pub searching: bool,
    pub waiting_for_address: bool,
    pub last_symbol_attempt: String,
    pub current_token: Option<ResolvedToken>,
}

impl SearchState {
    fn clear_search(&mut self) {
        self.query.clear();
        self.suggestions = SuggestionList::empty();
        self.waiting_for_address = false;
        self.last_symbol_attempt.clear();
    }
}

pub struct TokenResolver {
    lookup: Arc<dyn TokenLookup>,
    candidates: Vec<TokenCandidate>,
    filter: SuggestionFilter,
    generation: AtomicU64,
    state: Mutex<SearchState>,
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver")
            .field("lookup", &format_args!("<TokenLookup>"))
            .field("candidates", &self.candidates.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl TokenResolver {
    /// `claimed` tokens (already featured) are never suggested or matched.
    pub fn new(lookup: Arc<dyn TokenLookup>, tokens: &[TokenCandidate], claimed: &[TokenCandidate]) -> Self {
        Self {
            lookup,
            candidates: available_candidates(tokens, claimed),
            filter: SuggestionFilter::default(),
            generation: AtomicU64::new(0),
            state: Mutex::new(SearchState::default()),
        }
    }

    pub fn candidates(&self) -> &[TokenCandidate] {
        &self.candidates
    }

    pub async fn state(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    pub async fn set_query(&self, query: &str) -> SuggestionList {
        let mut state = self.state.lock().await;
        state.query = query.to_string();
        state.suggestions = self.filter.filter(&self.candidates, query);
        if query.trim().is_empty() {
            state.waiting_for_address = false;
            state.last_symbol_attempt.clear();
        }
        state.suggestions.clone()
    }

    pub async fn select_next(&self) -> usize {
        let mut state = self.state.lock().await;
        state.suggestions.select_next();
        state.suggestions.selected_index()
    }

    pub async fn select_previous(&self) -> usize {
        let mut state = self.state.lock().await;
        state.suggestions.select_previous();
        state.suggestions.selected_index()
    }

    /// Resolves the highlighted suggestion, or the raw query when there are
    /// no suggestions.
    pub async fn commit(&self) -> Result<Resolution> {
        let input = {
            let state = self.state.lock().await;
            match state.suggestions.selected() {
                Some(candidate) => candidate.symbol.clone(),
                None => state.query.trim().to_string(),
            }
        };
        self.resolve(&input).await
    }

    pub async fn resolve(&self, input: &str) -> Result<Resolution> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Resolution::Idle);
        }
        let needle = input.to_lowercase();
        // Any newer resolution supersedes a lookup still in flight.
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(candidate) = self.candidates.iter().find(|c| c.matches_exactly(&needle)) {
            debug!("Resolved {:?} locally to {}", input, candidate.address);
            let resolved = ResolvedToken::local(candidate.clone());
            self.apply_success(&resolved).await;
            return Ok(Resolution::Resolved(resolved));
        }

        if !is_probably_address(input) {
            let mut state = self.state.lock().await;
            state.last_symbol_attempt = input.to_string();
            state.waiting_for_address = true;
            state.searching = false;
            state.suggestions.clear();
            return Ok(Resolution::WaitingForAddress {
                symbol: input.to_string(),
            });
        }

        self.state.lock().await.searching = true;
        info!("Looking up address {} (request {})", input, ticket);

        let result = self.lookup.search_token(input).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Discarding stale lookup {} for {}", ticket, input);
            return Ok(Resolution::Stale);
        }

        match result {
            Ok(response) => {
                let resolved = ResolvedToken::external(response.into_candidate());
                self.apply_success(&resolved).await;
                Ok(Resolution::Resolved(resolved))
            }
            Err(e) => {
                error!("Backend fetch failed for {}: {}", input, e);
                let mut state = self.state.lock().await;
                state.suggestions.clear();
                state.waiting_for_address = false;
                state.last_symbol_attempt.clear();
                state.searching = false;
                Err(e)
            }
        }
    }

    async fn apply_success(&self, resolved: &ResolvedToken) {
        let mut state = self.state.lock().await;
        state.clear_search();
        state.searching = false;
        state.current_token = Some(resolved.clone());
    }

    /// Clears the search box. Any lookup still in flight becomes stale.
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.clear_search();
        state.searching = false;
    }

    /// Returns to the initial state, e.g. when the search surface closes.
    pub async fn reset(&self) {
        self.clear().await;
        *self.state.lock().await = SearchState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTokenLookup;
    use crate::error::Error;
    use crate::models::{TokenSource, WomScore};
    use crate::tests::common::{address, sample_candidates, search_response, ScriptedLookup};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn resolver_with(lookup: impl TokenLookup + 'static) -> TokenResolver {
        TokenResolver::new(Arc::new(lookup), &sample_candidates(), &[])
    }

    fn no_lookup() -> MockTokenLookup {
        let mut lookup = MockTokenLookup::new();
        lookup.expect_search_token().never();
        lookup
    }

    #[tokio::test]
    async fn test_local_match_skips_lookup() {
        let resolver = resolver_with(no_lookup());
        resolver.set_query("BON").await;

        let resolution = assert_ok!(resolver.resolve("BONK").await);
        match resolution {
            Resolution::Resolved(token) => {
                assert_eq!(token.source, TokenSource::Local);
                assert_eq!(token.token.symbol, "bonk");
            }
            other => panic!("unexpected resolution {:?}", other),
        }

        let state = resolver.state().await;
        assert!(state.query.is_empty());
        assert!(state.suggestions.is_empty());
        assert!(state.current_token.is_some());
    }

    #[tokio::test]
    async fn test_local_match_by_address_and_name() {
        let resolver = resolver_with(no_lookup());
        let wif = address("WF").to_lowercase();
        assert!(matches!(assert_ok!(resolver.resolve(&wif).await), Resolution::Resolved(_)));
        assert!(matches!(assert_ok!(resolver.resolve("Jupiter").await), Resolution::Resolved(_)));
    }

    #[tokio::test]
    async fn test_unknown_symbol_waits_for_address() {
        let resolver = resolver_with(no_lookup());
        resolver.set_query("pepe").await;

        let resolution = assert_ok!(resolver.resolve("pepe").await);
        assert_eq!(
            resolution,
            Resolution::WaitingForAddress {
                symbol: "pepe".to_string()
            }
        );
        let state = resolver.state().await;
        assert!(state.waiting_for_address);
        assert_eq!(state.last_symbol_attempt, "pepe");
        assert!(state.suggestions.is_empty());

        resolver.set_query("  ").await;
        let state = resolver.state().await;
        assert!(!state.waiting_for_address);
        assert!(state.last_symbol_attempt.is_empty());
    }

    #[tokio::test]
    async fn test_address_input_triggers_single_lookup() {
        let input = address("NEW").chars().chain("xyz".chars()).collect::<String>();
        assert_eq!(input.len(), 47);

        let mut lookup = MockTokenLookup::new();
        lookup
            .expect_search_token()
            .times(1)
            .returning(|input| Ok(search_response("NEW", input)));
        let resolver = resolver_with(lookup);

        let resolution = assert_ok!(resolver.resolve(&input).await);
        let Resolution::Resolved(token) = resolution else {
            panic!("expected a resolved token");
        };
        assert_eq!(token.source, TokenSource::External);
        assert_eq!(token.token.symbol, "$new");
        assert_eq!(token.token.address, input);
        assert_eq!(token.token.wom_score, Some(WomScore::Calculating));
        assert!(!resolver.state().await.searching);
    }

    #[tokio::test]
    async fn test_lookup_failure_returns_to_idle() {
        let mut lookup = MockTokenLookup::new();
        lookup.expect_search_token().times(1).returning(|_| {
            Err(Error::ApiStatus {
                status: 404,
                detail: "Token not found".to_string(),
            })
        });
        let resolver = resolver_with(lookup);
        resolver.set_query(&address("MISSING")).await;

        let result = resolver.resolve(&address("MISSING")).await;
        assert_err!(result);

        let state = resolver.state().await;
        assert!(!state.searching);
        assert!(!state.waiting_for_address);
        assert!(state.suggestions.is_empty());
        assert!(state.current_token.is_none());
    }

    #[tokio::test]
    async fn test_only_latest_lookup_is_applied() {
        let first = address("AAA");
        let second = address("BBB");
        // The first request answers last.
        let lookup = ScriptedLookup::new()
            .respond(&first, "AAA", Duration::from_millis(80))
            .respond(&second, "BBB", Duration::from_millis(10));
        let calls = lookup.calls();
        let resolver = resolver_with(lookup);

        let (a, b) = tokio::join!(resolver.resolve(&first), resolver.resolve(&second));

        assert_eq!(assert_ok!(a), Resolution::Stale);
        assert!(matches!(assert_ok!(b), Resolution::Resolved(_)));
        let state = resolver.state().await;
        let current = state.current_token.expect("token applied");
        assert_eq!(current.token.symbol, "$bbb");
        assert!(!state.searching);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_local_match_supersedes_pending_lookup() {
        let pending = address("AAA");
        let lookup = ScriptedLookup::new().respond(&pending, "AAA", Duration::from_millis(40));
        let resolver = resolver_with(lookup);

        let (a, b) = tokio::join!(resolver.resolve(&pending), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            resolver.resolve("bonk").await
        });

        assert_eq!(assert_ok!(a), Resolution::Stale);
        assert!(matches!(assert_ok!(b), Resolution::Resolved(_)));
        let state = resolver.state().await;
        assert_eq!(state.current_token.expect("token applied").token.symbol, "bonk");
        assert!(!state.searching);
    }

    #[tokio::test]
    async fn test_waiting_for_address_supersedes_pending_lookup() {
        let pending = address("AAA");
        let lookup = ScriptedLookup::new().respond(&pending, "AAA", Duration::from_millis(40));
        let resolver = resolver_with(lookup);

        let (a, b) = tokio::join!(resolver.resolve(&pending), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            resolver.resolve("pepe").await
        });

        assert_eq!(assert_ok!(a), Resolution::Stale);
        assert!(matches!(assert_ok!(b), Resolution::WaitingForAddress { .. }));
        let state = resolver.state().await;
        assert!(state.waiting_for_address);
        assert_eq!(state.last_symbol_attempt, "pepe");
        assert!(state.current_token.is_none());
        assert!(!state.searching);
    }

    #[tokio::test]
    async fn test_cursor_resets_when_query_changes() {
        let resolver = resolver_with(no_lookup());
        resolver.set_query("o").await;
        assert_eq!(resolver.select_next().await, 1);
        assert_eq!(resolver.select_next().await, 2);

        let suggestions = resolver.set_query("op").await;
        assert_eq!(suggestions.selected_index(), 0);
        assert_eq!(resolver.state().await.suggestions.selected_index(), 0);
    }

    #[tokio::test]
    async fn test_latest_lookup_wins_when_it_finishes_last() {
        let first = address("AAA");
        let second = address("BBB");
        let lookup = ScriptedLookup::new()
            .respond(&first, "AAA", Duration::from_millis(10))
            .respond(&second, "BBB", Duration::from_millis(80));
        let resolver = resolver_with(lookup);

        let (a, b) = tokio::join!(resolver.resolve(&first), resolver.resolve(&second));

        assert_eq!(assert_ok!(a), Resolution::Stale);
        assert!(matches!(assert_ok!(b), Resolution::Resolved(_)));
        let current = resolver.state().await.current_token.expect("token applied");
        assert_eq!(current.token.symbol, "$bbb");
    }

    #[tokio::test]
    async fn test_clear_makes_in_flight_lookup_stale() {
        let target = address("AAA");
        let lookup = ScriptedLookup::new().respond(&target, "AAA", Duration::from_millis(30));
        let resolver = resolver_with(lookup);

        let (resolution, _) = tokio::join!(resolver.resolve(&target), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            assert!(resolver.state().await.searching);
            resolver.clear().await;
        });

        assert_eq!(assert_ok!(resolution), Resolution::Stale);
        let state = resolver.state().await;
        assert!(!state.searching);
        assert!(state.current_token.is_none());
    }

    #[tokio::test]
    async fn test_commit_uses_cursor_then_raw_query() {
        let resolver = resolver_with(no_lookup());
        resolver.set_query("o").await;
        resolver.select_next().await;

        let Resolution::Resolved(token) = assert_ok!(resolver.commit().await) else {
            panic!("expected a resolved token");
        };
        assert_eq!(token.token.symbol, "popcat");

        resolver.set_query(" shib ").await;
        assert_eq!(
            assert_ok!(resolver.commit().await),
            Resolution::WaitingForAddress {
                symbol: "shib".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_claimed_tokens_are_not_resolved_locally() {
        let tokens = sample_candidates();
        let claimed = vec![tokens[0].clone()];
        let resolver = TokenResolver::new(Arc::new(no_lookup()), &tokens, &claimed);
        assert!(matches!(
            assert_ok!(resolver.resolve("bonk").await),
            Resolution::WaitingForAddress { .. }
        ));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let resolver = resolver_with(no_lookup());
        resolver.resolve("wif").await.unwrap();
        resolver.set_query("bo").await;
        resolver.reset().await;
        assert_eq!(resolver.state().await, SearchState::default());
        assert_eq!(assert_ok!(resolver.resolve("").await), Resolution::Idle);
    }
}
