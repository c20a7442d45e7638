//! Memoization of query results
//!
//! A fixed-capacity, time-to-live cache keyed by the query signature
//! (operation name + canonicalized arguments). Overflow evicts the
//! least-recently-used entry. Any store mutation invalidates the whole
//! cache: correctness by wholesale invalidation instead of fine-grained
//! dependency tracking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

const DEFAULT_CAPACITY: usize = 128;
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached query result with its token estimate.
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub value: Value,
    pub token_estimate: usize,
}

struct Entry {
    result: Arc<CachedResult>,
    inserted: Instant,
    last_used: Instant,
}

/// Fixed-capacity TTL+LRU cache for query envelopes.
pub struct QueryCache {
    entries: Mutex<HashMap<String, Entry>>,
    capacity: usize,
    ttl: Duration,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Build a cache key from the operation name and its arguments.
    pub fn key(operation: &str, args: &[(&str, String)]) -> String {
        let mut key = String::from(operation);
        for (name, value) in args {
            key.push_str("::");
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }
        key
    }

    /// Fetch a live entry, refreshing its LRU position.
    pub fn get(&self, key: &str) -> Option<Arc<CachedResult>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(entry) = entries.get(key) {
            if now.duration_since(entry.inserted) > self.ttl {
                entries.remove(key);
                return None;
            }
        }
        entries.get_mut(key).map(|entry| {
            entry.last_used = now;
            entry.result.clone()
        })
    }

    /// Store an entry, evicting the least-recently-used one on overflow.
    pub fn put(&self, key: String, result: Arc<CachedResult>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                result,
                inserted: now,
                last_used: now,
            },
        );
    }

    /// Drop every entry. Called on any store mutation, before readers can
    /// observe the mutated store.
    pub fn invalidate_all(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
        log::debug!("query cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
