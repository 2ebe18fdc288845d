//! In-memory per-request cache backed by moka.
//!
//! Coordinates are rounded to 3 decimals (about 100 m) so nearby requests
//! share an entry. The wildfire radius is part of the key since it changes
//! the wildfire result.

use std::time::Duration;

use moka::sync::Cache;
use serde::Serialize;

use super::SignalRequest;

pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);
pub const DEFAULT_MAX_ENTRIES: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_milli: i64,
    lon_milli: i64,
    radius_m: i64,
    city: Option<String>,
}

impl CacheKey {
    pub fn new(request: &SignalRequest) -> Self {
        Self {
            lat_milli: (request.coordinates.latitude * 1000.0).round() as i64,
            lon_milli: (request.coordinates.longitude * 1000.0).round() as i64,
            radius_m: (request.wildfire_radius_km * 1000.0).round() as i64,
            city: request
                .city
                .as_deref()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: u64,
    pub max_entries: u64,
    pub ttl_seconds: u64,
}

/// TTL cache with a size cap. Entries expire `ttl` after insertion.
pub struct LocationCache<V> {
    cache: Cache<CacheKey, V>,
    ttl: Duration,
    max_entries: u64,
}

impl<V: Clone + Send + Sync + 'static> Default for LocationCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl<V: Clone + Send + Sync + 'static> LocationCache<V> {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        self.cache.insert(key, value);
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Entry count after pending evictions are applied.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            max_entries: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}
