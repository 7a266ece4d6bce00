//! Builder for [`FeatureStore`]

use crate::config::FeatureStoreConfig;
use crate::error::{Result, SdkError};
use crate::facade::FeatureStore;
use crate::retry_buffer::L2RetryBuffer;
use feature_store_core::FeatureDefinition;
use feature_store_repository::{InMemoryL2Store, L2Store};
use feature_store_runtime::{CostTracker, DistributedLock, FeatureRegistry, InMemoryL1, L1Cache, NoopLock, RawDataGateway, RawDataProvider, SingleflightCoordinator};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Builder for [`FeatureStore`].
///
/// # Example
///
/// ```rust,ignore
/// use feature_store_sdk::FeatureStoreBuilder;
///
/// let store = FeatureStoreBuilder::new(my_provider)
///     .with_feature(ret_5d_definition())
///     .build()?;
/// ```
pub struct FeatureStoreBuilder<P: RawDataProvider + 'static> {
    provider: P,
    config: FeatureStoreConfig,
    definitions: Vec<FeatureDefinition>,
    l1: Option<Arc<dyn L1Cache>>,
    l2: Option<Arc<dyn L2Store>>,
    distributed_lock: Option<Arc<dyn DistributedLock>>,
    instance_id: Option<Uuid>,
}

impl<P: RawDataProvider + 'static> FeatureStoreBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: FeatureStoreConfig::default(),
            definitions: Vec::new(),
            l1: None,
            l2: None,
            distributed_lock: None,
            instance_id: None,
        }
    }

    pub fn with_config(mut self, config: FeatureStoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a feature. Duplicate `(name, version)` pairs are rejected at
    /// `build()` time, not here, so registration order never matters.
    pub fn with_feature(mut self, defn: FeatureDefinition) -> Self {
        self.definitions.push(defn);
        self
    }

    pub fn with_features(mut self, defns: impl IntoIterator<Item = FeatureDefinition>) -> Self {
        self.definitions.extend(defns);
        self
    }

    /// Override the L1 tier. Defaults to [`InMemoryL1`] — fine for a single
    /// process, but most deployments supply a shared cache here instead.
    pub fn with_l1(mut self, l1: Arc<dyn L1Cache>) -> Self {
        self.l1 = Some(l1);
        self
    }

    /// Override the L2 tier. Defaults to [`InMemoryL2Store`] — most
    /// deployments supply `feature_store_repository::PostgresL2Store` here.
    pub fn with_l2(mut self, l2: Arc<dyn L2Store>) -> Self {
        self.l2 = Some(l2);
        self
    }

    /// Supply a cross-process distributed lock for the Singleflight
    /// Coordinator. Defaults to [`NoopLock`] (single-process dedup only).
    pub fn with_distributed_lock(mut self, lock: Arc<dyn DistributedLock>) -> Self {
        self.distributed_lock = Some(lock);
        self
    }

    /// Override the instance identifier used to tie-break concurrent L2
    /// writers. Defaults to a freshly generated v4 UUID.
    pub fn with_instance_id(mut self, id: Uuid) -> Self {
        self.instance_id = Some(id);
        self
    }

    pub fn build(self) -> Result<FeatureStore<P>> {
        let mut registry = FeatureRegistry::new();
        for defn in self.definitions {
            registry.register(defn).map_err(SdkError::Runtime)?;
        }

        let compute_permits = Arc::new(Semaphore::new(self.config.compute_pool_size));
        let pending_permits = Arc::new(Semaphore::new(self.config.pending_compute_buffer));
        let l2 = self.l2.unwrap_or_else(|| Arc::new(InMemoryL2Store::new()));
        let retry_buffer = Arc::new(L2RetryBuffer::new(self.config.l2_retry_buffer_size));

        let store = FeatureStore {
            registry: Arc::new(registry),
            l1: self.l1.unwrap_or_else(|| Arc::new(InMemoryL1::new())),
            l2,
            gateway: Arc::new(RawDataGateway::new(self.provider)),
            singleflight: Arc::new(SingleflightCoordinator::new(self.distributed_lock.unwrap_or_else(|| Arc::new(NoopLock)))),
            cost_tracker: Arc::new(CostTracker::new()),
            config: self.config,
            instance_id: self.instance_id.unwrap_or_else(Uuid::new_v4),
            pending_permits,
            compute_permits,
            retry_buffer,
        };

        store.spawn_retry_buffer_flusher(Duration::from_secs(5));
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use feature_store_core::{Bar, ComputeOutcome, TtlClass};
    use feature_store_runtime::RuntimeError;

    struct EmptyProvider;

    #[async_trait]
    impl RawDataProvider for EmptyProvider {
        async fn fetch_range(&self, _ticker: &str, _start: DateTime<Utc>, _end: DateTime<Utc>) -> feature_store_runtime::Result<Vec<Bar>> {
            Err(RuntimeError::UnknownTicker("none".to_string()))
        }
    }

    fn stub_feature(name: &str) -> FeatureDefinition {
        FeatureDefinition::new(name, 1, TtlClass::Daily, 5, vec![], "test", Arc::new(|_| ComputeOutcome::Absent))
    }

    #[test]
    fn builds_with_defaults() {
        let store = FeatureStoreBuilder::new(EmptyProvider).with_feature(stub_feature("ret_5d")).build().unwrap();
        assert_eq!(store.registry().len(), 1);
    }

    #[test]
    fn duplicate_feature_registration_fails() {
        let result = FeatureStoreBuilder::new(EmptyProvider)
            .with_feature(stub_feature("ret_5d"))
            .with_feature(stub_feature("ret_5d"))
            .build();
        assert!(result.is_err());
    }
}
