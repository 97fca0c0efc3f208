//! Incremental suggestion filtering with a keyboard-style selection cursor.

use crate::models::TokenCandidate;
use std::collections::HashSet;

/// Most suggestions shown for a single query.
pub const MAX_SUGGESTIONS: usize = 15;

/// What the suggestion area should show. An empty query and a query without
/// matches are rendered differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionState {
    NoQuery,
    NoMatches,
    Matches(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionList {
    entries: Vec<TokenCandidate>,
    has_query: bool,
    selected: usize,
}

impl SuggestionList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TokenCandidate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> SuggestionState {
        match (self.has_query, self.entries.len()) {
            (false, _) => SuggestionState::NoQuery,
            (true, 0) => SuggestionState::NoMatches,
            (true, n) => SuggestionState::Matches(n),
        }
    }

    /// Cursor position; 0 on an empty list means nothing is selected.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&TokenCandidate> {
        self.entries.get(self.selected)
    }

    pub fn select_next(&mut self) {
        let last = self.entries.len().saturating_sub(1);
        self.selected = (self.selected + 1).min(last);
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Drops all entries but remembers whether a query is still present.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected = 0;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuggestionFilter {
    limit: usize,
}

impl Default for SuggestionFilter {
    fn default() -> Self {
        Self::new(MAX_SUGGESTIONS)
    }
}

impl SuggestionFilter {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Candidates whose symbol, name or address contains `query`, ignoring
    /// case, in their original order. The cursor starts at the top.
    pub fn filter(&self, candidates: &[TokenCandidate], query: &str) -> SuggestionList {
        if query.is_empty() {
            return SuggestionList::empty();
        }
        let needle = query.to_lowercase();
        let entries = candidates
            .iter()
            .filter(|candidate| candidate.contains(&needle))
            .take(self.limit)
            .cloned()
            .collect();

        SuggestionList {
            entries,
            has_query: true,
            selected: 0,
        }
    }
}

/// Removes tokens that were already claimed (e.g. featured), compared by
/// address without regard to case.
pub fn available_candidates(tokens: &[TokenCandidate], claimed: &[TokenCandidate]) -> Vec<TokenCandidate> {
    let claimed: HashSet<String> = claimed
        .iter()
        .map(|token| token.address.to_lowercase())
        .collect();
    tokens
        .iter()
        .filter(|token| !claimed.contains(&token.address.to_lowercase()))
        .cloned()
        .collect()
}
