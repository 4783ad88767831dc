// In-memory TTL cache for resolved embed configs

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    cached_at: Instant,
}

/// Simple in-memory cache with a single TTL
///
/// A zero TTL disables caching entirely. Lock poisoning degrades to a miss.
pub struct TtlCache<V> {
    store: RwLock<HashMap<String, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Cached value, if present and not expired
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }

        let store = self.store.read().ok()?;
        let entry = store.get(key)?;
        if entry.cached_at.elapsed() > self.ttl {
            drop(store);
            self.invalidate(key);
            return None;
        }

        Some(entry.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        if !self.is_enabled() {
            return;
        }

        if let Ok(mut store) = self.store.write() {
            // Opportunistic sweep keeps the map bounded by live keys
            let ttl = self.ttl;
            store.retain(|_, e| e.cached_at.elapsed() <= ttl);
            store.insert(
                key.into(),
                Entry {
                    value,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    pub fn invalidate(&self, key: &str) {
        if let Ok(mut store) = self.store.write() {
            store.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut store) = self.store.write() {
            store.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
