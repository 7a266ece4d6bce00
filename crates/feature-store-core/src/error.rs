//! Error types shared across the Feature Store workspace

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// A ticker string failed the short-uppercase-symbol check
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// A feature name used in a key does not match the registered identifier shape
    #[error("Invalid feature name: {0}")]
    InvalidFeatureName(String),

    /// Type error while interpreting a metadata [`Value`](crate::Value)
    #[error("Type error: {0}")]
    TypeError(String),

    /// Invalid value, e.g. a non-finite float where a scalar was expected
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
