//! Feature Store SDK
//!
//! High-level embeddable API: resolve `(ticker, feature_name, as_of)`
//! triples to scalar values, transparently checking the hot L1 tier, the
//! durable L2 tier, and falling back to on-demand computation from raw
//! OHLCV data with at-most-once dedup per key.

pub mod builder;
pub mod config;
pub mod error;
pub mod facade;
pub mod retry_buffer;

pub use builder::FeatureStoreBuilder;
pub use config::FeatureStoreConfig;
pub use error::{Result, SdkError};
pub use facade::{FeatureBatch, FeatureStore, GetFeaturesOptions, Telemetry, WarmReport};
pub use retry_buffer::L2RetryBuffer;

// Re-exported so embedders configuring a store do not need a direct
// dependency on the lower crates for the common types.
pub use feature_store_core::{Bar, ComputeOutcome, FeatureDefinition, FeatureKey, FeatureValue, RawField, ScalarValue, SourceTier, TtlClass, Value};
pub use feature_store_repository::{InMemoryL2Store, L2Row, L2Store};
pub use feature_store_runtime::{CostTracker, FeatureRegistry, InMemoryL1, L1Cache, NoopLock, RawDataGateway, RawDataProvider};
