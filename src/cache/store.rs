//! In-memory cache store with expiry-on-read

use super::types::{CacheEntry, CachePayload};
use crate::core::time::TimeProvider;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Key to (timestamp, payload) map, expiry checked at read time.
///
/// Absence is reported both for keys never set and for keys whose entry has
/// expired; callers cannot distinguish the two. There is no eviction beyond
/// expiry-on-read, so the map grows for the session lifetime.
pub struct MemoryCache {
    time: Arc<dyn TimeProvider>,
    entries: HashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new(time: Arc<dyn TimeProvider>) -> Self {
        Self {
            time,
            entries: HashMap::new(),
        }
    }

    /// Look up a key, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<&CachePayload> {
        let entry = self.entries.get(key)?;
        let age = self
            .time
            .system_time()
            .duration_since(entry.created_at)
            .unwrap_or(Duration::ZERO);

        if age >= Duration::from_secs(entry.expiry_minutes * 60) {
            log::debug!("cache entry '{}' expired ({:?} old)", key, age);
            return None;
        }

        Some(&entry.payload)
    }

    /// Store a payload, replacing any previous entry under the key.
    pub fn put(&mut self, key: impl Into<String>, payload: CachePayload, expiry_minutes: u64) {
        let key = key.into();
        log::debug!("cache store '{}' (expires in {}m)", key, expiry_minutes);
        self.entries.insert(
            key,
            CacheEntry {
                created_at: self.time.system_time(),
                expiry_minutes,
                payload,
            },
        );
    }
}
