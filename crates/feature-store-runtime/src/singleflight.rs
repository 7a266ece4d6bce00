//! Singleflight Coordinator (C6) — at most one compute in flight per
//! [`FeatureKey`](feature_store_core::FeatureKey) process-wide, with
//! concurrent callers sharing the single result.

use async_trait::async_trait;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// A short-lived distributed lock used to extend singleflight dedup across
/// processes. `try_acquire` returning `false` means the caller should poll
/// peers for the result rather than block — a stuck lock must never halt
/// progress.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> bool;
    async fn release(&self, key: &str);
}

/// Single-process deployments: the lock always succeeds, so cross-process
/// polling never triggers.
pub struct NoopLock;

#[async_trait]
impl DistributedLock for NoopLock {
    async fn try_acquire(&self, _key: &str, _ttl: Duration) -> bool {
        true
    }

    async fn release(&self, _key: &str) {}
}

type Shared<T, E> = Arc<OnceCell<Arc<std::result::Result<T, E>>>>;

/// Removes the in-flight entry once this caller's wait on the shared
/// `OnceCell` resolves, whether it resolved by computing, by observing a
/// peer's computation, or by panicking. Runs even on unwind so a panicking
/// compute does not leave the key permanently stuck.
struct CleanupGuard<'a, T, E> {
    map: &'a DashMap<String, Shared<T, E>>,
    key: String,
}

impl<'a, T, E> Drop for CleanupGuard<'a, T, E> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

/// Process-local (and, with a real [`DistributedLock`], cross-process)
/// compute deduplication keyed by the caller-supplied string (normally a
/// [`FeatureKey::encode`](feature_store_core::FeatureKey::encode) output).
pub struct SingleflightCoordinator<T, E> {
    in_flight: DashMap<String, Shared<T, E>>,
    lock: Arc<dyn DistributedLock>,
}

impl<T, E> SingleflightCoordinator<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(lock: Arc<dyn DistributedLock>) -> Self {
        Self { in_flight: DashMap::new(), lock }
    }

    /// Run `compute` with at most one concurrent execution per `key` in this
    /// process. All callers racing for the same key observe the identical
    /// `Result<T, E>` — they share the same underlying future via
    /// [`OnceCell`].
    pub async fn do_once<F, Fut>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let cell = self.in_flight.entry(key.to_string()).or_insert_with(|| Arc::new(OnceCell::new())).clone();
        let _guard = CleanupGuard { map: &self.in_flight, key: key.to_string() };

        let result = cell.get_or_init(|| async move { Arc::new(compute().await) }).await.clone();
        (*result).clone()
    }

    /// Try to take the cross-process lock for `key`. Callers that fail to
    /// acquire it should poll peers (L1/L2) for a fresher result up to
    /// `singleflight_poll_deadline` before falling back to their own
    /// compute — see the Feature Store Facade.
    pub async fn try_acquire_distributed(&self, key: &str, ttl: Duration) -> bool {
        self.lock.try_acquire(key, ttl).await
    }

    pub async fn release_distributed(&self, key: &str) {
        self.lock.release(key).await;
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn concurrent_callers_share_one_compute() {
        let coord: Arc<SingleflightCoordinator<i32, String>> = Arc::new(SingleflightCoordinator::new(Arc::new(NoopLock)));
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let coord = coord.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                coord
                    .do_once("AAPL:ret_20d", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(StdDuration::from_millis(20)).await;
                        Ok::<i32, String>(42)
                    })
                    .await
            }));
        }

        for h in handles {
            assert_eq!(h.await.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_compute_is_not_cached() {
        let coord: SingleflightCoordinator<i32, String> = SingleflightCoordinator::new(Arc::new(NoopLock));

        let first = coord.do_once("k", || async { Err::<i32, String>("boom".to_string()) }).await;
        assert_eq!(first, Err("boom".to_string()));
        assert_eq!(coord.in_flight_count(), 0);

        let second = coord.do_once("k", || async { Ok::<i32, String>(7) }).await;
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn distributed_lock_delegates_to_implementation() {
        struct AlwaysBusy;
        #[async_trait]
        impl DistributedLock for AlwaysBusy {
            async fn try_acquire(&self, _key: &str, _ttl: Duration) -> bool {
                false
            }
            async fn release(&self, _key: &str) {}
        }

        let coord: SingleflightCoordinator<i32, String> = SingleflightCoordinator::new(Arc::new(AlwaysBusy));
        assert!(!coord.try_acquire_distributed("k", StdDuration::from_secs(30)).await);
    }
}
