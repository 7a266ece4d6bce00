//! Feature Store Runtime — the execution machinery around the data model
//! defined in `feature-store-core`:
//!
//! - [`registry::FeatureRegistry`] (C1) — registered feature definitions
//! - [`gateway`] (C2) — raw OHLCV fetch with the `as_of` look-ahead cutoff
//! - [`l1::L1Cache`] (C3) — the hot, best-effort key-value tier
//! - [`compute`] (C5) — runs a feature's compute function against bars
//! - [`singleflight::SingleflightCoordinator`] (C6) — at-most-once compute per key
//! - [`observability`] (C8) — metrics and tracing

pub mod compute;
pub mod error;
pub mod gateway;
pub mod l1;
pub mod observability;
pub mod registry;
pub mod singleflight;

pub use error::{Result, RuntimeError};
pub use gateway::{RawDataGateway, RawDataProvider};
pub use l1::{InMemoryL1, L1Cache, UnavailableL1};
pub use observability::{CostTracker, Metrics, MetricsCollector, RequestTier};
pub use registry::FeatureRegistry;
pub use singleflight::{DistributedLock, NoopLock, SingleflightCoordinator};
