//! Cache registry and background sweeper
//!
//! Every cache instance registers itself here once at construction. A
//! single background task then sweeps all of them on a fixed interval,
//! so adding a cache never means adding a timer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{CacheStats, TtlCache};

/// Object-safe view of a cache for registry-driven maintenance
pub trait ManagedCache: Send + Sync {
    fn name(&self) -> &'static str;
    fn cleanup(&self) -> usize;
    fn stats(&self) -> CacheStats;
    fn clear(&self);
}

impl<K, V> ManagedCache for TtlCache<K, V>
where
    K: Eq + std::hash::Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        TtlCache::name(self)
    }

    fn cleanup(&self) -> usize {
        TtlCache::cleanup(self)
    }

    fn stats(&self) -> CacheStats {
        TtlCache::stats(self)
    }

    fn clear(&self) {
        TtlCache::clear(self)
    }
}

/// Holds every cache instance that wants periodic maintenance
#[derive(Default)]
pub struct CacheRegistry {
    caches: Mutex<Vec<Arc<dyn ManagedCache>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, cache: Arc<dyn ManagedCache>) {
        debug!(cache = cache.name(), "Registering cache");
        self.caches.lock().push(cache);
    }

    /// Sweep every registered cache; returns total entries removed
    pub fn run_cleanup(&self) -> usize {
        let caches = self.caches.lock().clone();
        let mut total = 0;
        for cache in &caches {
            let removed = cache.cleanup();
            if removed > 0 {
                debug!(cache = cache.name(), removed, "Cache cleanup");
            }
            total += removed;
        }
        total
    }

    /// Snapshot of per-cache counters, keyed by cache name
    pub fn all_stats(&self) -> BTreeMap<String, CacheStats> {
        self.caches
            .lock()
            .iter()
            .map(|cache| (cache.name().to_string(), cache.stats()))
            .collect()
    }

    /// Drop every entry from every registered cache
    pub fn clear_all(&self) {
        for cache in self.caches.lock().iter() {
            cache.clear();
        }
    }
}

/// Spawn the periodic sweep task
///
/// Waits `startup_delay` before the first sweep so caches are not churned
/// while the process is still warming up, then sweeps every `interval`.
/// Flipping the shutdown channel to `true` stops the task.
pub fn spawn_sweeper(
    registry: Arc<CacheRegistry>,
    startup_delay: Duration,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(startup_delay) => {}
            _ = shutdown.changed() => {
                info!("Cache sweeper stopped before first sweep");
                return;
            }
        }

        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = registry.run_cleanup();
                    debug!(removed, "Periodic cache sweep");
                }
                _ = shutdown.changed() => {
                    info!("Cache sweeper stopped");
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCache {
        name: &'static str,
        cleanups: AtomicUsize,
    }

    impl CountingCache {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                cleanups: AtomicUsize::new(0),
            })
        }
    }

    impl ManagedCache for CountingCache {
        fn name(&self) -> &'static str {
            self.name
        }

        fn cleanup(&self) -> usize {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            1
        }

        fn stats(&self) -> CacheStats {
            CacheStats {
                size: 0,
                valid_entries: 0,
            }
        }

        fn clear(&self) {}
    }

    #[test]
    fn test_run_cleanup_sums_across_caches() {
        let registry = CacheRegistry::new();
        registry.register(CountingCache::new("a"));
        registry.register(CountingCache::new("b"));
        assert_eq!(registry.run_cleanup(), 2);
    }

    #[test]
    fn test_all_stats_keyed_by_name() {
        let registry = CacheRegistry::new();
        let cache: Arc<TtlCache<String, i64>> =
            Arc::new(TtlCache::new("filters", Duration::from_secs(60), 10));
        cache.insert("k".to_string(), 1);
        registry.register(cache);
        let stats = registry.all_stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats["filters"].size, 1);
        assert_eq!(stats["filters"].valid_entries, 1);
    }

    #[test]
    fn test_clear_all() {
        let registry = CacheRegistry::new();
        let cache: Arc<TtlCache<String, i64>> =
            Arc::new(TtlCache::new("filters", Duration::from_secs(60), 10));
        cache.insert("k".to_string(), 1);
        registry.register(cache.clone());
        registry.clear_all();
        assert_eq!(cache.stats().size, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_honors_startup_delay_and_interval() {
        let registry = Arc::new(CacheRegistry::new());
        let cache = CountingCache::new("a");
        registry.register(cache.clone());

        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(
            registry,
            Duration::from_secs(60),
            Duration::from_secs(300),
            rx,
        );
        // Let the task register its startup timer before the clock moves
        tokio::task::yield_now().await;

        // Still inside the startup delay: no sweep yet
        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.cleanups.load(Ordering::SeqCst), 0);

        // Past the delay the interval fires immediately
        tokio::time::advance(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.cleanups.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(300)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.cleanups.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_during_startup_delay() {
        let registry = Arc::new(CacheRegistry::new());
        let cache = CountingCache::new("a");
        registry.register(cache.clone());

        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(
            registry,
            Duration::from_secs(60),
            Duration::from_secs(300),
            rx,
        );

        tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(cache.cleanups.load(Ordering::SeqCst), 0);
    }
}
