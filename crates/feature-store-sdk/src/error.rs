//! SDK error types — the Facade's (C7) external error surface, composing
//! the per-crate errors beneath it (spec.md §7).

use feature_store_repository::RepositoryError;
use feature_store_runtime::RuntimeError;
use thiserror::Error;

/// Error returned by [`crate::FeatureStore`] operations.
///
/// Cache-tier failures (`TierUnavailable`) are absorbed internally and
/// never surface here — the Facade degrades instead of failing the call.
/// This type covers only the errors spec.md §7 says are terminal to a
/// call, or that propagate through Singleflight to waiters.
#[derive(Error, Debug)]
pub enum SdkError {
    /// A requested feature name is not registered. Terminal to the whole
    /// call even in partial mode, since there is no sensible partial
    /// result for a name the Registry cannot resolve.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// The raw-data provider rejected the ticker. Terminal per-feature;
    /// in `partial` mode other features in the same batch may still
    /// succeed.
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    /// Transient upstream failure, surfaced after the Raw Data Gateway's
    /// retry budget is exhausted.
    #[error("upstream provider failure: {0}")]
    Upstream(String),

    /// The caller-provided deadline elapsed while waiting on Singleflight
    /// or on a tier round trip. The compute that was in flight continues
    /// in the background; this error only unblocks the waiting caller.
    #[error("deadline exceeded")]
    Deadline,

    /// The pending-compute buffer exceeded its bound (spec.md §5); the
    /// caller should back off rather than be queued indefinitely.
    #[error("feature store overloaded, pending compute buffer exhausted")]
    Overloaded,

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, SdkError>;
