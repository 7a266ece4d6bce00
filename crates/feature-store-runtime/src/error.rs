//! Runtime error types

use feature_store_core::CoreError;
use thiserror::Error;

/// Runtime error, covering the Registry, Raw Data Gateway, L1 Cache,
/// Compute Engine, and Singleflight Coordinator.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("feature not registered: {0}")]
    UnknownFeature(String),

    #[error("feature already registered: {name} v{version}")]
    AlreadyRegistered { name: String, version: u32 },

    #[error("ticker rejected by provider: {0}")]
    UnknownTicker(String),

    #[error("insufficient data: need {needed} bars, got {got}")]
    InsufficientData { needed: u32, got: usize },

    #[error("upstream provider failure: {0}")]
    Upstream(String),

    #[error("deadline exceeded")]
    Deadline,

    /// A cache/storage tier could not be reached. Never fatal by itself —
    /// callers degrade to the next tier and record the condition via the
    /// Cost Tracker rather than failing the request (spec.md §7).
    #[error("{tier} unavailable: {reason}")]
    TierUnavailable { tier: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
