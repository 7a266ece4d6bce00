//! L1 Cache (C3) — a hot, low-latency key to value store with per-entry
//! TTL. Treated as a volatile accelerator: contents may vanish at any time
//! without correctness impact, so reads are best-effort and a miss never
//! implies the value is absent from L2.

use crate::error::Result;
use async_trait::async_trait;
use feature_store_core::FeatureValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Network-facing L1 interface. A real deployment backs this with a shared
/// cache (Redis, memcached); tests and single-process deployments use
/// [`InMemoryL1`].
///
/// Every method is fallible because L1 is, per spec.md §4.3, "accessed over
/// the network"; an `Err` here means the tier itself could not be reached,
/// not that the requested keys were absent. Callers (the Facade) treat an
/// `Err` as "all of these keys are misses" and record `l1_unavailable`
/// rather than failing the request — L1 is a volatile accelerator whose
/// unavailability must never be fatal.
#[async_trait]
pub trait L1Cache: Send + Sync {
    /// Batched get. Entries not present (or expired) are simply absent from
    /// the returned map — this is not distinguishable from "never set".
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, FeatureValue>>;

    /// Idempotent, last-writer-wins.
    async fn set(&self, key: String, value: FeatureValue, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

struct Entry {
    value: FeatureValue,
    expires_at: Instant,
}

/// A process-local L1 implementation backed by a `RwLock<HashMap>`.
///
/// Suitable for tests and for single-process deployments; a networked
/// deployment would implement [`L1Cache`] against a real cache tier instead
/// while keeping the same interface the Facade depends on.
#[derive(Clone, Default)]
pub struct InMemoryL1 {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryL1 {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl L1Cache for InMemoryL1 {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, FeatureValue>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(k).filter(|e| e.expires_at > now).map(|e| (k.clone(), e.value.clone())))
            .collect())
    }

    async fn set(&self, key: String, value: FeatureValue, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key, Entry { value, expires_at: Instant::now() + ttl });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Test/demo double that always reports the tier as unreachable, for
/// exercising the Facade's degrade-to-L2 path (spec.md §4.3, §8 scenario 6).
#[derive(Default)]
pub struct UnavailableL1;

#[async_trait]
impl L1Cache for UnavailableL1 {
    async fn get(&self, _keys: &[String]) -> Result<HashMap<String, FeatureValue>> {
        Err(crate::error::RuntimeError::TierUnavailable { tier: "l1", reason: "connection refused".to_string() })
    }

    async fn set(&self, _key: String, _value: FeatureValue, _ttl: Duration) -> Result<()> {
        Err(crate::error::RuntimeError::TierUnavailable { tier: "l1", reason: "connection refused".to_string() })
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(crate::error::RuntimeError::TierUnavailable { tier: "l1", reason: "connection refused".to_string() })
    }
}
