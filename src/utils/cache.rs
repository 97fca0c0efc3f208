use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Small TTL cache keyed by string. Expired entries are evicted on lookup
/// and swept on every insert.
#[derive(Debug, Clone)]
pub struct Cache<T> {
    data: Arc<Mutex<HashMap<String, (T, Instant)>>>,
    ttl: Duration,
}

impl<T: Clone> Cache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let mut data = self.data.lock().await;
        match data.get(key) {
            Some((value, stored_at)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                data.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn set(&self, key: String, value: T) {
        if self.ttl.is_zero() {
            return;
        }
        let ttl = self.ttl;
        let mut data = self.data.lock().await;
        data.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        data.insert(key, (value, Instant::now()));
    }

    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_hit_and_expiry() {
        let cache = Cache::new(Duration::from_millis(20));
        cache.set("wif".to_string(), 1u32).await;
        assert_eq!(cache.get("wif").await, Some(1));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("wif").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_caching() {
        let cache = Cache::new(Duration::ZERO);
        cache.set("wif".to_string(), 1u32).await;
        assert_eq!(cache.get("wif").await, None);
    }

    #[tokio::test]
    async fn test_insert_sweeps_expired_keys() {
        let cache = Cache::new(Duration::from_millis(20));
        cache.set("wif".to_string(), 1u32).await;
        cache.set("bonk".to_string(), 2u32).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.set("popcat".to_string(), 3u32).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("popcat").await, Some(3));
    }
}
