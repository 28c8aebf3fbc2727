//! LRU cache of object definitions in front of a slower loader (usually SQLite).
//! Definitions are immutable, so entries are never invalidated; only evicted.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::warn;

use super::{ObjectDef, ObjectDefinitions};
use crate::db::DbError;

/// Source of definitions on a cache miss.
pub trait DefinitionLoader: Send {
    fn load(&mut self, id: u32) -> Result<Option<ObjectDef>, DbError>;
}

impl<F> DefinitionLoader for F
where
    F: FnMut(u32) -> Result<Option<ObjectDef>, DbError> + Send,
{
    fn load(&mut self, id: u32) -> Result<Option<ObjectDef>, DbError> { self(id) }
}

#[derive(Copy, Clone, Debug)]
pub struct DefinitionCacheConfig {
    pub capacity: usize,
}

impl Default for DefinitionCacheConfig {
    fn default() -> Self { Self { capacity: 4096 } }
}

pub struct DefinitionCache<L: DefinitionLoader> {
    cfg: DefinitionCacheConfig,
    loader: Mutex<L>,
    // Misses are cached as None so unknown ids do not hit the loader every tick.
    entries: Mutex<LruCache<u32, Option<Arc<ObjectDef>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<L: DefinitionLoader> DefinitionCache<L> {
    pub fn new(loader: L) -> Self { Self::with_config(loader, DefinitionCacheConfig::default()) }

    pub fn with_config(loader: L, cfg: DefinitionCacheConfig) -> Self {
        let cap = NonZeroUsize::new(cfg.capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cfg,
            loader: Mutex::new(loader),
            entries: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize { self.cfg.capacity }

    pub fn cached(&self) -> usize {
        self.entries.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

impl<L: DefinitionLoader> ObjectDefinitions for DefinitionCache<L> {
    fn get(&self, id: u32) -> Option<Arc<ObjectDef>> {
        if let Ok(mut guard) = self.entries.lock() {
            if let Some(hit) = guard.get(&id) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return hit.clone();
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let loaded = match self.loader.lock() {
            Ok(mut loader) => loader.load(id),
            Err(_) => return None,
        };
        let value = match loaded {
            Ok(def) => def.map(Arc::new),
            Err(e) => {
                // Not cached: a transient failure should be retried on the next lookup.
                warn!(object_id = id, error = %e, "object definition load failed");
                return None;
            }
        };
        if let Ok(mut guard) = self.entries.lock() {
            guard.put(id, value.clone());
        }
        value
    }
}

// Prove Send + Sync bounds for compile-time safety.
#[allow(dead_code)]
fn _assert_send_sync() {
    fn assert_bound<T: Send + Sync>() {}
    assert_bound::<DefinitionCache<crate::db::Database>>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_loader(calls: Arc<AtomicUsize>) -> impl FnMut(u32) -> Result<Option<ObjectDef>, DbError> + Send {
        move |id| {
            calls.fetch_add(1, Ordering::SeqCst);
            if id == 0 { return Ok(None); }
            Ok(Some(ObjectDef::new(id, 1, 1, 0)))
        }
    }

    #[test]
    fn repeated_lookups_hit_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DefinitionCache::new(counting_loader(Arc::clone(&calls)));
        assert_eq!(cache.get(5).unwrap().id, 5);
        assert_eq!(cache.get(5).unwrap().id, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn unknown_ids_are_cached_as_missing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DefinitionCache::new(counting_loader(Arc::clone(&calls)));
        assert!(cache.get(0).is_none());
        assert!(cache.get(0).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn capacity_bounds_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DefinitionCache::with_config(counting_loader(Arc::clone(&calls)), DefinitionCacheConfig { capacity: 2 });
        for id in 1..=5 { cache.get(id); }
        assert_eq!(cache.cached(), 2);
        // 1 was evicted and must be reloaded
        cache.get(1);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn loader_errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let cache = DefinitionCache::new(move |_id: u32| -> Result<Option<ObjectDef>, DbError> {
            c.fetch_add(1, Ordering::SeqCst);
            Err(DbError::Corrupt("bad row".into()))
        });
        assert!(cache.get(3).is_none());
        assert!(cache.get(3).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
