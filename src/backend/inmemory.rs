//! In-memory response store (default, process-local).
//!
//! Uses DashMap for concurrent access with per-key sharding. Deadlines are
//! measured on the tokio clock, so a paused runtime controls expiry in tests.

use super::CacheBackend;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One stored response envelope.
struct StoredResponse {
    bytes: Vec<u8>,
    deadline: Option<Instant>,
}

impl StoredResponse {
    /// Live strictly before its deadline.
    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now < deadline)
    }
}

/// Process-local response store.
///
/// Clones share entries; separately constructed stores never do.
///
/// ```no_run
/// use service_center_kit::backend::{CacheBackend, InMemoryBackend};
/// use std::time::Duration;
///
/// # async fn demo() -> service_center_kit::Result<()> {
/// let store = InMemoryBackend::new();
/// store
///     .set("GET_/customers", b"[]".to_vec(), Some(Duration::from_secs(10)))
///     .await?;
/// assert!(store.exists("GET_/customers").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    entries: Arc<DashMap<String, StoredResponse>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries held, expired ones included until they are read or purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry; returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, stored| stored.is_live(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Response store purged {} expired entries", purged);
        }
        purged
    }

    pub fn stats(&self) -> StoreStats {
        let now = Instant::now();
        self.entries
            .iter()
            .fold(StoreStats::default(), |mut stats, stored| {
                stats.entries += 1;
                stats.bytes += stored.bytes.len();
                if !stored.is_live(now) {
                    stats.expired += 1;
                }
                stats
            })
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.bytes.clone());

        if hit.is_none() {
            // Only drop what is still expired; a concurrent set may have
            // replaced it.
            self.entries.remove_if(key, |_, stored| !stored.is_live(now));
        }
        debug!("Store GET {} -> {}", key, if hit.is_some() { "HIT" } else { "MISS" });
        Ok(hit)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let stored = StoredResponse {
            bytes: value,
            deadline: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), stored);
        debug!("Store SET {} (ttl: {:?})", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            debug!("Store DELETE {}", key);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .is_some_and(|stored| stored.is_live(now)))
    }

    async fn clear_all(&self) -> Result<()> {
        let dropped = self.entries.len();
        self.entries.clear();
        info!("Response store cleared ({} entries)", dropped);
        Ok(())
    }
}

/// Snapshot of what the store holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub entries: usize,
    pub expired: usize,
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOMERS: &str = "GET_/customers";

    #[tokio::test]
    async fn test_list_and_item_keys_are_separate() {
        let store = InMemoryBackend::new();
        store.set(CUSTOMERS, b"[]".to_vec(), None).await.unwrap();
        store
            .set("GET_/customers/7", b"{\"id\":7}".to_vec(), None)
            .await
            .unwrap();

        assert_eq!(store.get(CUSTOMERS).await.unwrap(), Some(b"[]".to_vec()));
        assert_eq!(
            store.get("GET_/customers/7").await.unwrap(),
            Some(b"{\"id\":7}".to_vec())
        );
        assert_eq!(store.get("GET_/vehicles").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_deadline() {
        let store = InMemoryBackend::new();
        store
            .set(CUSTOMERS, b"[]".to_vec(), Some(Duration::from_secs(10)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(9_999)).await;
        assert!(store.exists(CUSTOMERS).await.unwrap());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!store.exists(CUSTOMERS).await.unwrap());
        assert_eq!(store.len(), 1);

        assert_eq!(store.get(CUSTOMERS).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_and_stats() {
        let store = InMemoryBackend::new();
        store
            .set("GET_/users", b"[1,2]".to_vec(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        store.set("GET_/brands", b"[]".to_vec(), None).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(
            store.stats(),
            StoreStats {
                entries: 2,
                expired: 1,
                bytes: 7,
            }
        );

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.stats().entries, 1);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let store = InMemoryBackend::new();
        store.set(CUSTOMERS, b"[]".to_vec(), None).await.unwrap();
        store.set("GET_/invoices", b"[]".to_vec(), None).await.unwrap();

        store.delete(CUSTOMERS).await.unwrap();
        store.delete(CUSTOMERS).await.unwrap();
        assert!(!store.exists(CUSTOMERS).await.unwrap());

        store.clear_all().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = InMemoryBackend::new();
        let view = store.clone();
        store.set(CUSTOMERS, b"[]".to_vec(), None).await.unwrap();

        assert!(view.exists(CUSTOMERS).await.unwrap());
        assert!(!InMemoryBackend::new().exists(CUSTOMERS).await.unwrap());
    }
}
