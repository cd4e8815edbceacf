//! In-process TTL cache for account balances.
//!
//! Thread-safe map with per-entry expiry. Expired entries are dropped lazily
//! on access; the keyspace is bounded by the number of active users, so no
//! eviction order is tracked.

use std::{
    collections::HashMap,
    sync::RwLock,
    time::{Duration, Instant},
};

use async_trait::async_trait;

use super::{BalanceCache, CachedBalance};
use crate::ledger::UserId;

/// Default time-to-live for cached balances (300 seconds).
pub const DEFAULT_BALANCE_TTL: Duration = Duration::from_secs(300);

struct TtlEntry {
    value: CachedBalance,
    cached_at: Instant,
}

/// In-process [`BalanceCache`] implementation with a fixed TTL.
pub struct InMemoryBalanceCache {
    entries: RwLock<HashMap<UserId, TtlEntry>>,
    ttl: Duration,
}

impl InMemoryBalanceCache {
    /// Create a cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_BALANCE_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of entries currently held, including not-yet-collected expired
    /// ones.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBalanceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BalanceCache for InMemoryBalanceCache {
    async fn get(&self, user_id: UserId) -> Option<CachedBalance> {
        let now = Instant::now();

        {
            let entries = self.entries.read().ok()?;
            match entries.get(&user_id) {
                Some(entry) if now.duration_since(entry.cached_at) <= self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but expired; drop it under the write lock.
        if let Ok(mut entries) = self.entries.write() {
            if let Some(entry) = entries.get(&user_id) {
                if now.duration_since(entry.cached_at) > self.ttl {
                    entries.remove(&user_id);
                }
            }
        }
        None
    }

    async fn put(&self, user_id: UserId, balance: CachedBalance) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                user_id,
                TtlEntry {
                    value: balance,
                    cached_at: Instant::now(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(balance: i64) -> CachedBalance {
        CachedBalance {
            balance,
            currency: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = InMemoryBalanceCache::new();
        cache.put(1, usd(10_000)).await;

        assert_eq!(cache.get(1).await, Some(usd(10_000)));
        assert_eq!(cache.get(2).await, None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = InMemoryBalanceCache::new();
        cache.put(1, usd(10_000)).await;
        cache.put(1, usd(2_500)).await;

        assert_eq!(cache.get(1).await, Some(usd(2_500)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryBalanceCache::with_ttl(Duration::from_millis(20));
        cache.put(1, usd(10_000)).await;
        assert!(cache.get(1).await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(1).await, None);
        assert!(cache.is_empty(), "expired entry should be collected");
    }

    #[tokio::test]
    async fn test_put_refreshes_expiry() {
        let cache = InMemoryBalanceCache::with_ttl(Duration::from_millis(50));
        cache.put(1, usd(10_000)).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.put(1, usd(11_000)).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(1).await, Some(usd(11_000)));
    }
}
