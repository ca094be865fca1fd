//! Time-bounded in-memory cache for provider responses.
//!
//! Entries expire lazily: an entry older than its TTL is removed on the next
//! read of that exact key. There is no background sweep. Memory is bounded
//! only when a maximum entry count is configured, in which case the least
//! recently used entry is evicted to make room.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

/// TTL applied by [`TtlCache::set`] unless the cache was built with another.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) > self.ttl
    }
}

/// Expiring key/value store shared by reference between product clients.
pub struct TtlCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an unbounded cache on the system clock.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates an unbounded cache that reads time from `clock`.
    #[must_use]
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
            default_ttl,
            clock,
        }
    }

    /// Caps the cache at `max_entries`, evicting least recently used entries
    /// once full.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: NonZeroUsize) -> Self {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .resize(max_entries);
        self
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores `value` under `key` with the default TTL, replacing any
    /// existing entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key` with an explicit TTL, replacing any
    /// existing entry.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
            ttl,
        };
        if let Some((evicted, _)) = self.lock().push(key.into(), entry) {
            tracing::trace!(key = %evicted, "cache entry replaced or evicted");
        }
    }

    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
        }
        entries.pop(key);
        tracing::trace!(key, "cache entry expired");
        None
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_cache(ttl: Duration) -> (TtlCache<String>, ManualClock) {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(ttl, Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn get_on_missing_key_is_none() {
        let (cache, _) = manual_cache(Duration::from_secs(60));
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn set_then_get_returns_value() {
        let (cache, _) = manual_cache(Duration::from_secs(60));
        cache.set("k", "v".to_owned());
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn entry_is_live_exactly_at_ttl() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        cache.set("k", "v".to_owned());
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn expired_entry_is_removed_and_stays_gone() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        cache.set("k", "v".to_owned());
        clock.advance(Duration::from_secs(61));

        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0, "expired entry should be removed on read");
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn expired_entries_linger_until_read() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        cache.set("a", "1".to_owned());
        cache.set("b", "2".to_owned());
        clock.advance(Duration::from_secs(120));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1, "only the read key is evicted");
    }

    #[test]
    fn set_with_ttl_overrides_default() {
        let (cache, clock) = manual_cache(Duration::from_secs(3600));
        cache.set_with_ttl("short", "v".to_owned(), Duration::from_secs(5));
        clock.advance(Duration::from_secs(6));
        assert!(cache.get("short").is_none());
    }

    #[test]
    fn set_overwrites_and_restamps() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        cache.set("k", "old".to_owned());
        clock.advance(Duration::from_secs(50));
        cache.set("k", "new".to_owned());
        clock.advance(Duration::from_secs(50));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn clear_removes_everything() {
        let (cache, _) = manual_cache(Duration::from_secs(60));
        cache.set("a", "1".to_owned());
        cache.set("b", "2".to_owned());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let (cache, _) = manual_cache(Duration::from_secs(60));
        let cache = cache.with_max_entries(NonZeroUsize::new(2).unwrap());
        cache.set("a", "1".to_owned());
        cache.set("b", "2".to_owned());
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get("a").is_some());
        cache.set("c", "3".to_owned());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn default_ttl_is_one_day() {
        let cache: TtlCache<String> = TtlCache::new(DEFAULT_TTL);
        assert_eq!(cache.default_ttl(), Duration::from_secs(86_400));
    }
}
