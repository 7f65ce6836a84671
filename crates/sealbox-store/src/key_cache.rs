//! In-memory master-key cache with a sliding TTL.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sealbox_crypto::MasterKey;
use tokio::task::JoinHandle;

/// Time a cached master key stays live without being used.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(60_000);

struct CacheInner {
    master_key: Option<MasterKey>,
    timeout: Duration,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Timed cache for the unwrapped master key.
///
/// Whenever a key is present, a one-shot expiry task is armed; every hit
/// re-arms it, giving a sliding TTL. Arming happens under the cache mutex and
/// bumps a generation counter, so a superseded expiry task never clears a
/// newer key. Expiry collapses straight to the empty state — the next
/// operation transparently re-requests the key.
///
/// Must be used from within a tokio runtime; the expiry task is spawned on
/// the current runtime.
#[derive(Clone)]
pub struct KeyCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl KeyCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                master_key: None,
                timeout,
                generation: 0,
                timer: None,
            })),
        }
    }

    /// Cache a key, replacing any existing one. A `timeout` override becomes
    /// the stored timeout for this and subsequent re-arms.
    pub fn update(&self, master_key: MasterKey, timeout: Option<Duration>) {
        let mut inner = self.inner.lock();
        if let Some(timeout) = timeout {
            inner.timeout = timeout;
        }
        inner.master_key = Some(master_key);
        self.arm_locked(&mut inner);
    }

    /// Return the cached key, if any. A hit re-arms the expiry timer.
    pub fn get(&self) -> Option<MasterKey> {
        let mut inner = self.inner.lock();
        let master_key = inner.master_key.clone()?;
        self.arm_locked(&mut inner);
        Some(master_key)
    }

    /// Re-arm the expiry timer with the stored timeout. No-op when empty.
    pub fn reset_timeout(&self) {
        let mut inner = self.inner.lock();
        if inner.master_key.is_some() {
            self.arm_locked(&mut inner);
        }
    }

    /// Drop the cached key immediately.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.master_key = None;
    }

    fn arm_locked(&self, inner: &mut CacheInner) {
        inner.generation += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        let generation = inner.generation;
        let timeout = inner.timeout;
        let cache = Arc::clone(&self.inner);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut inner = cache.lock();
            if inner.generation == generation {
                inner.master_key = None;
                inner.timer = None;
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn test_key() -> MasterKey {
        MasterKey::generate().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_timeout() {
        let cache = KeyCache::new(Duration::from_millis(60_000));
        cache.update(test_key(), None);
        sleep(Duration::from_millis(1_000)).await;
        assert!(cache.get().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_timeout() {
        let cache = KeyCache::new(Duration::from_millis(60_000));
        cache.update(test_key(), None);
        sleep(Duration::from_millis(60_001)).await;
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn hits_slide_the_ttl() {
        let cache = KeyCache::new(Duration::from_millis(100));
        cache.update(test_key(), None);
        for _ in 0..5 {
            sleep(Duration::from_millis(80)).await;
            assert!(cache.get().is_some());
        }
        sleep(Duration::from_millis(101)).await;
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn update_timeout_override_sticks() {
        let cache = KeyCache::new(Duration::from_millis(60_000));
        cache.update(test_key(), Some(Duration::from_millis(10)));
        sleep(Duration::from_millis(11)).await;
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn update_rearms_over_a_pending_expiry() {
        let cache = KeyCache::new(Duration::from_millis(100));
        cache.update(test_key(), None);
        sleep(Duration::from_millis(90)).await;
        cache.update(test_key(), None);
        sleep(Duration::from_millis(90)).await;
        assert!(cache.get().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_immediately() {
        let cache = KeyCache::new(Duration::from_millis(60_000));
        cache.update(test_key(), None);
        cache.clear();
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_timeout_on_empty_cache_is_a_noop() {
        let cache = KeyCache::new(Duration::from_millis(100));
        cache.reset_timeout();
        assert!(cache.get().is_none());
    }
}
