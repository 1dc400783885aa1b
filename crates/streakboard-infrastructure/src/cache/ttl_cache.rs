use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use streakboard_domain::Clock;

struct Slot<V> {
    value: V,
    computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Time-bounded cache with its own lock.
///
/// A slot is fresh while `now - computed_at < ttl`. Concurrent misses on one
/// key each recompute and the last writer wins; values must therefore be pure
/// functions of the state they were computed from.
pub struct TtlCache<K, V> {
    slots: RwLock<HashMap<K, Slot<V>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(clock: Arc<dyn Clock>, ttl: std::time::Duration, max_entries: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            clock,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::weeks(52 * 100)),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, computed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - computed_at < self.ttl
    }

    /// Fresh value for `key`, if any
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let guard = self.slots.read().await;
        let value = guard
            .get(key)
            .filter(|slot| self.is_fresh(slot.computed_at, now))
            .map(|slot| slot.value.clone());

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Store `value` as computed at `computed_at`, evicting the oldest slot
    /// when a new key would exceed the capacity.
    pub async fn insert(&self, key: K, value: V, computed_at: DateTime<Utc>) {
        let mut guard = self.slots.write().await;

        if !guard.contains_key(&key) && guard.len() >= self.max_entries {
            let oldest = guard
                .iter()
                .min_by_key(|(_, slot)| slot.computed_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("[cache] evicting oldest slot key={:?}", oldest);
                guard.remove(&oldest);
            }
        }

        guard.insert(key, Slot { value, computed_at });
    }

    /// Return the fresh slot or run `compute` and overwrite it.
    ///
    /// No lock is held while `compute` runs, and a failed computation leaves
    /// the slot as it was.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!("[cache] hit key={:?}", key);
            return Ok(value);
        }

        let computed_at = self.clock.now();
        debug!("[cache] miss key={:?}", key);
        let value = compute().await?;
        self.insert(key, value.clone(), computed_at).await;
        Ok(value)
    }

    /// Drop slots computed more than `max_age` ago; returns how many were removed
    pub async fn sweep_older_than(&self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let mut guard = self.slots.write().await;
        let before = guard.len();
        guard.retain(|_, slot| now - slot.computed_at <= max_age);
        before - guard.len()
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.slots.write().await.remove(key).is_some()
    }

    pub async fn invalidate_all(&self) -> usize {
        let mut guard = self.slots.write().await;
        let removed = guard.len();
        guard.clear();
        removed
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
