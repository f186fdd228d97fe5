use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use fxhash::FxHashMap;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{error::RoutingError, road_network::RoadNetwork};

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

type NetworkCell = Arc<OnceCell<Arc<RoadNetwork>>>;

struct CacheEntry {
    network: NetworkCell,
    last_used: u64,

    /// Lookups currently holding `network`
    holders: usize,
}

/// Releases a lookup's hold on an entry. The last holder of an entry that
/// was never filled removes it, whether its build failed or was dropped.
struct EntryHold<'a> {
    cache: &'a RoadNetworkCache,
    key: &'a str,
    network: NetworkCell,
}

impl Drop for EntryHold<'_> {
    fn drop(&mut self) {
        let mut entries = self.cache.entries.lock();

        let Some(entry) = entries.get_mut(self.key) else {
            return;
        };
        if !Arc::ptr_eq(&entry.network, &self.network) {
            return;
        }

        entry.holders = entry.holders.saturating_sub(1);

        if entry.holders == 0 && !entry.network.initialized() {
            debug!("Discarding unbuilt road network {}", self.key);
            entries.remove(self.key);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Road networks keyed by rounded bounding box.
///
/// Concurrent requests for the same key share a single build. A build that
/// fails or whose future is dropped leaves nothing behind, so the next
/// request starts over. With a capacity, the least recently used network is
/// evicted once the capacity is exceeded.
pub struct RoadNetworkCache {
    entries: Mutex<FxHashMap<String, CacheEntry>>,
    capacity: Option<usize>,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for RoadNetworkCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl RoadNetworkCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            capacity,
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Some(capacity.max(1)))
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Returns the network stored under `key`, building it with `build` on a miss.
    pub async fn get_or_build<F, Fut>(
        &self,
        key: &str,
        build: F,
    ) -> Result<Arc<RoadNetwork>, RoutingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RoadNetwork, RoutingError>>,
    {
        let hold = {
            let mut entries = self.entries.lock();
            let tick = self.clock.fetch_add(1, Ordering::Relaxed);

            let entry = entries.entry(key.to_string()).or_insert_with(|| CacheEntry {
                network: Arc::new(OnceCell::new()),
                last_used: tick,
                holders: 0,
            });
            entry.last_used = tick;
            entry.holders += 1;

            EntryHold {
                cache: self,
                key,
                network: entry.network.clone(),
            }
        };

        if let Some(network) = hold.network.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Using cached road network for {}", key);
            return Ok(network.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);

        let result = hold
            .network
            .get_or_try_init(move || async move {
                info!("Building road network for {}", key);
                build().await.map(Arc::new)
            })
            .await
            .cloned();

        drop(hold);

        if result.is_ok() {
            self.evict();
        }

        result
    }

    pub fn get(&self, key: &str) -> Option<Arc<RoadNetwork>> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .and_then(|entry| entry.network.get().cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored networks.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock();
        entries
            .values()
            .filter(|entry| entry.network.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn evict(&self) {
        let Some(capacity) = self.capacity else {
            return;
        };

        let mut entries = self.entries.lock();

        loop {
            let populated = entries
                .values()
                .filter(|entry| entry.network.initialized())
                .count();

            if populated <= capacity {
                break;
            }

            let oldest = entries
                .iter()
                .filter(|(_, entry)| entry.network.initialized())
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());

            match oldest {
                Some(key) => {
                    debug!("Evicting road network {}", key);
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::{geopoint::GeoPoint, test_utils::grid_network};

    fn counted_build(
        counter: &AtomicUsize,
    ) -> impl Future<Output = Result<RoadNetwork, RoutingError>> + '_ {
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(grid_network(2, 2, 50.0, 4.0, 0.001))
        }
    }

    #[tokio::test]
    async fn second_lookup_is_a_hit() {
        let cache = RoadNetworkCache::unbounded();
        let builds = AtomicUsize::new(0);

        let first = cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        let second = cache.get_or_build("a", || counted_build(&builds)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn distinct_keys_are_distinct_entries() {
        let cache = RoadNetworkCache::unbounded();
        let builds = AtomicUsize::new(0);

        cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        cache.get_or_build("b", || counted_build(&builds)).await.unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[tokio::test]
    async fn failed_build_is_not_stored() {
        let cache = RoadNetworkCache::unbounded();

        let result = cache
            .get_or_build("a", || async { Err(RoutingError::NoPath) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert!(cache.entries.lock().is_empty());

        let builds = AtomicUsize::new(0);
        cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(cache.contains("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_builds_are_collapsed() {
        let cache = RoadNetworkCache::unbounded();
        let builds = AtomicUsize::new(0);

        let slow_build = || async {
            builds.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(grid_network(2, 2, 50.0, 4.0, 0.001))
        };

        let (a, b) = tokio::join!(
            cache.get_or_build("a", slow_build),
            cache.get_or_build("a", slow_build)
        );

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_build_does_not_populate() {
        let cache = RoadNetworkCache::unbounded();

        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            cache.get_or_build("a", || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(grid_network(2, 2, 50.0, 4.0, 0.001))
            }),
        )
        .await;

        assert!(abandoned.is_err());
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!cache.contains("a"));
        assert!(cache.is_empty());
        assert!(cache.entries.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_stores_network_after_leader_fails() {
        let cache = RoadNetworkCache::unbounded();

        let leader = cache.get_or_build("a", || async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Err(RoutingError::Cancelled)
        });
        let waiter = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cache
                .get_or_build("a", || async { Ok(grid_network(2, 2, 50.0, 4.0, 0.001)) })
                .await
        };

        let (leader, waiter) = tokio::join!(leader, waiter);

        assert!(matches!(leader, Err(RoutingError::Cancelled)));
        let network = waiter.unwrap();
        assert!(cache.contains("a"));
        assert!(Arc::ptr_eq(&network, &cache.get("a").unwrap()));

        let builds = AtomicUsize::new(0);
        cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_kept_while_a_waiter_remains() {
        let cache = RoadNetworkCache::unbounded();

        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            cache.get_or_build("a", || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(grid_network(2, 2, 50.0, 4.0, 0.001))
            }),
        );
        let waiter = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cache
                .get_or_build("a", || async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Ok(grid_network(2, 2, 50.0, 4.0, 0.001))
                })
                .await
        };

        let (abandoned, waiter) = tokio::join!(abandoned, waiter);

        assert!(abandoned.is_err());
        assert!(waiter.is_ok());
        assert!(cache.contains("a"));
        assert_eq!(cache.entries.lock().len(), 1);
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = RoadNetworkCache::with_capacity(2);
        let builds = AtomicUsize::new(0);

        cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        cache.get_or_build("b", || counted_build(&builds)).await.unwrap();
        // Touch "a" so that "b" becomes the oldest
        cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        cache.get_or_build("c", || counted_build(&builds)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[tokio::test]
    async fn clear_resets_entries_and_stats() {
        let cache = RoadNetworkCache::default();
        let builds = AtomicUsize::new(0);

        let network = cache.get_or_build("a", || counted_build(&builds)).await.unwrap();
        assert!(network.node_coordinates(0).is_some());
        assert_eq!(
            network.node_coordinates(0).copied(),
            Some(GeoPoint::new(50.0, 4.0))
        );

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.capacity(), Some(DEFAULT_CACHE_CAPACITY));
    }
}
