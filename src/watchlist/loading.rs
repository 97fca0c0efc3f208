use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Symbols currently being resolved, used to render placeholders.
///
/// Membership is tied to a [`LoadingGuard`]; dropping the guard removes the
/// symbol, so no exit path of a resolution can leave it behind.
#[derive(Debug, Clone, Default)]
pub struct LoadingSet {
    symbols: Arc<Mutex<BTreeSet<String>>>,
}

impl LoadingSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn symbols(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.symbols.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `symbol` as loading. Returns `None` if it already is.
    pub fn begin(&self, symbol: &str) -> Option<LoadingGuard> {
        if !self.symbols().insert(symbol.to_string()) {
            return None;
        }
        Some(LoadingGuard {
            set: self.clone(),
            symbol: symbol.to_string(),
        })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols().contains(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols().is_empty()
    }

    /// Loading symbols in sorted order.
    pub fn snapshot(&self) -> Vec<String> {
        self.symbols().iter().cloned().collect()
    }
}

#[must_use = "the symbol stops loading as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LoadingGuard {
    set: LoadingSet,
    symbol: String,
}

impl LoadingGuard {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.set.symbols().remove(&self.symbol);
    }
}
