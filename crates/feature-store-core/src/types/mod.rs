//! Type system for the Feature Store data model
//!
//! - [`bar`] — raw OHLCV observations
//! - [`key`] — [`FeatureKey`](key::FeatureKey) cache-key identity
//! - [`value`] — opaque metadata blob
//! - [`value_state`] — [`FeatureValue`](value_state::FeatureValue) and its scalar state

pub mod bar;
pub mod definition;
pub mod key;
pub mod value;
pub mod value_state;

pub use bar::Bar;
pub use definition::{ComputeFn, ComputeOutcome, FeatureDefinition, RawField};
pub use key::{FeatureKey, TtlClass};
pub use value::Value;
pub use value_state::{FeatureValue, ScalarValue, SourceTier};
