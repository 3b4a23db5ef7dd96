use lru::LruCache;
use sha2::{Digest, Sha256};
use std::{
    num::NonZeroUsize,
    sync::Mutex,
    time::{Duration, Instant},
};

/// Default number of cached credentials.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default credential lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Stable cache key for an outbound client identity.
pub fn fingerprint(identity: &str) -> String {
    hex::encode(Sha256::digest(identity.as_bytes()))
}

#[derive(Debug, Clone)]
struct CacheEntry {
    cookie: String,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// LRU cache of upstream session cookies with a fixed time-to-live.
///
/// Entries leave the cache either by capacity eviction or by expiring. An
/// expired entry is never returned, even while it still occupies a slot.
pub struct CredentialCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl CredentialCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up a cookie by fingerprint.
    pub fn get(&self, fingerprint: &str) -> Option<String> {
        let mut cache = self.lock();

        let expired = match cache.get(fingerprint) {
            Some(entry) if entry.is_live(Instant::now()) => {
                tracing::debug!("Credential cache hit: {}", fingerprint);
                return Some(entry.cookie.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            tracing::debug!("Credential cache entry expired: {}", fingerprint);
            cache.pop(fingerprint);
        } else {
            tracing::debug!("Credential cache miss: {}", fingerprint);
        }

        None
    }

    /// Store a cookie, replacing any previous value for the fingerprint.
    pub fn put(&self, fingerprint: &str, cookie: String) {
        let entry = CacheEntry {
            cookie,
            expires_at: Instant::now().checked_add(self.ttl),
        };

        if let Some((evicted, _)) = self.lock().push(fingerprint.to_string(), entry)
            && evicted != fingerprint
        {
            tracing::debug!("Credential cache evicted: {}", evicted);
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get current cache size, including expired entries not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CacheEntry>> {
        // A panic while holding the lock cannot leave the LRU half-updated
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn test_fingerprint_is_stable_hash() {
        let fp = fingerprint("Mozilla/5.0");

        assert_eq!(fp, fingerprint("Mozilla/5.0"));
        assert_ne!(fp, fingerprint("curl/8.0"));
        assert_eq!(fp.len(), 64);
        assert!(!fp.contains("Mozilla"));
    }

    #[test]
    fn test_hit_then_expire() {
        let cache = CredentialCache::new(10, Duration::from_millis(40));
        cache.put("k", "hdntl=abc".to_string());

        assert_eq!(cache.get("k").as_deref(), Some("hdntl=abc"));

        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unbounded_ttl_never_expires() {
        let cache = CredentialCache::new(2, Duration::from_secs(u64::MAX));
        cache.put("k", "hdntl=abc".to_string());

        assert_eq!(cache.get("k").as_deref(), Some("hdntl=abc"));
        assert_eq!(cache.ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = CredentialCache::new(3, Duration::from_secs(60));
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        cache.put("c", "3".to_string());

        // touch "a" so "b" becomes the oldest
        assert!(cache.get("a").is_some());

        cache.put("d", "4".to_string());

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
        assert_eq!(cache.get("d").as_deref(), Some("4"));
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let cache = CredentialCache::new(2, Duration::from_secs(60));
        cache.put("k", "old".to_string());
        cache.put("k", "new".to_string());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn test_concurrent_puts() {
        let cache = Arc::new(CredentialCache::new(8, Duration::from_secs(60)));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for j in 0..100 {
                        cache.put("shared", format!("{}-{}", i, j));
                        cache.put(&format!("key-{}", i % 4), i.to_string());
                        let _ = cache.get("shared");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let value = cache.get("shared").unwrap();
        assert!(value.ends_with("-99"));
        assert!(cache.len() <= 8);
    }
}
