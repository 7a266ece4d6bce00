//! Feature Store Core - shared data model for the Feature Store
//!
//! This crate provides the fundamental types used across the Feature Store
//! workspace:
//! - [`FeatureKey`] and [`TtlClass`] — the identity of a cached value
//! - [`FeatureValue`] and [`ScalarValue`] — a cached scalar and its provenance
//! - [`FeatureDefinition`] — a registered feature and its compute function
//! - [`Bar`] — a single OHLCV raw-data observation
//! - [`Value`] — an opaque structured blob used for feature metadata
//! - [`CoreError`] — the shared error type

pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::bar::Bar;
pub use types::definition::{ComputeFn, ComputeOutcome, FeatureDefinition, RawField};
pub use types::key::{FeatureKey, TtlClass};
pub use types::value::Value;
pub use types::value_state::{FeatureValue, ScalarValue, SourceTier};
