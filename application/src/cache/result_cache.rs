//! TTL-bounded memo of successful tool outcomes.
//!
//! Entries are keyed by [`CacheKey`] and expire `ttl` after insertion. An
//! expired entry is never returned by [`ResultCache::get`], whether or not
//! the sweeper has removed it yet.
//!
//! Error outcomes are never stored, so a transient tool failure cannot be
//! replayed from the cache.

use cloudgenie_domain::{CacheKey, CacheStats};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One memoized tool outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub content: String,
    pub is_error: bool,
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Thread-safe result cache shared by all orchestration calls.
///
/// The lock is a plain `std::sync::RwLock`: it is only ever held for a map
/// operation and never across an `.await`.
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl ResultCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now(), self.ttl) {
            trace!(key = %key, "cache entry expired");
            return None;
        }
        Some(entry.clone())
    }

    /// Store an outcome. Error outcomes are refused.
    pub fn set(&self, key: CacheKey, content: impl Into<String>, is_error: bool) {
        if is_error {
            debug!(key = %key, "not caching error result");
            return;
        }
        let entry = CacheEntry {
            content: content.into(),
            is_error,
            created_at: Instant::now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Remove every expired entry; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - entries.len()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval` until
    /// `cancel` fires.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("cache sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = cache.sweep_expired();
                        if removed > 0 {
                            debug!(removed, "swept expired cache entries");
                        }
                    }
                }
            }
        })
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            total_entries: entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(tool: &str) -> CacheKey {
        CacheKey::fingerprint_value(tool, &json!({}))
    }

    #[tokio::test(start_paused = true)]
    async fn get_returns_fresh_entry() {
        let cache = ResultCache::new(Duration::from_secs(300));
        cache.set(key("list_blueprints"), "[]", false);

        let entry = cache.get(&key("list_blueprints")).expect("entry");
        assert_eq!(entry.content, "[]");
        assert!(!entry.is_error);
    }

    #[tokio::test(start_paused = true)]
    async fn error_results_are_never_stored() {
        let cache = ResultCache::default();
        cache.set(key("create_resource"), "boom", true);

        assert!(cache.get(&key("create_resource")).is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl_even_before_sweep() {
        let cache = ResultCache::new(Duration::from_secs(300));
        cache.set(key("list_blueprints"), "[]", false);

        tokio::time::advance(Duration::from_secs(300)).await;
        assert!(cache.get(&key("list_blueprints")).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key("list_blueprints")).is_none());
        // Still physically present until swept.
        assert_eq!(cache.stats().total_entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired() {
        let cache = ResultCache::new(Duration::from_secs(10));
        cache.set(key("old"), "a", false);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set(key("new"), "b", false);
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.sweep_expired(), 1);
        assert!(cache.get(&key("old")).is_none());
        assert!(cache.get(&key("new")).is_some());
        assert_eq!(cache.stats().total_entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_and_refreshes() {
        let cache = ResultCache::new(Duration::from_secs(10));
        cache.set(key("t"), "first", false);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set(key("t"), "second", false);
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.get(&key("t")).unwrap().content, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_on_interval_and_stops_on_cancel() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(5)));
        let token = CancellationToken::new();
        let handle = cache.spawn_sweeper(Duration::from_secs(60), token.clone());

        cache.set(key("t"), "x", false);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.stats().total_entries, 0);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_access_is_safe() {
        let cache = Arc::new(ResultCache::default());
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let k = CacheKey::fingerprint_value("get_resource", &json!({ "id": i }));
                cache.set(k.clone(), format!("resource {}", i), false);
                cache.get(&k).map(|e| e.content)
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(format!("resource {}", i)));
        }
        assert_eq!(cache.stats().total_entries, 16);
    }
}
