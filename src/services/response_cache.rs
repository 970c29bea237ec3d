use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Default entry lifetime: 5 minutes.
pub const DEFAULT_TTL_MS: i64 = 300_000;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: DateTime<Utc>,
}

/// In-memory key/value store with per-entry expiry, used to avoid
/// redundant commerce-backend reads.
///
/// There is no background eviction sweep: the map only shrinks when an
/// expired key is read or overwritten, so unattended expired entries stay
/// resident until next touched. Callers that care can run
/// `purge_expired` themselves; nothing here schedules it.
pub struct TtlCache<T: Clone> {
    entries: DashMap<String, CacheEntry<T>>,
    default_ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self::with_default_ttl(Duration::milliseconds(DEFAULT_TTL_MS))
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Store `value` under `key` for the default lifetime.
    pub fn set(&self, key: &str, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: &str, value: T, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                expires_at: Utc::now() + ttl,
            },
        );
    }

    /// Return the value while it is still live. A read at or after expiry
    /// evicts the entry and behaves as a miss; there is no window where an
    /// expired entry is observable.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Utc::now();

        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                return Some(entry.data.clone());
            }
        }

        // Expired (or raced away); drop the stale entry if it is still
        // the one we saw.
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-shot sweep of expired entries. Never scheduled internally.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, remaining = self.entries.len(), "cache_purge_completed");
        }
        purged
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
