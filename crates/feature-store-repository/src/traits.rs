//! L2 Store (C4) — durable, time-indexed storage for computed feature
//! values, keyed by `(ticker, feature_name, as_of, version)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feature_store_core::{FeatureKey, FeatureValue};
use std::collections::HashMap;
use uuid::Uuid;

use crate::RepositoryResult;

/// A durable row. Mirrors the stable on-disk contract: `id` (autoincrement),
/// `ticker`, `feature_name`, `value`, `as_of`, `calculated_at`, `version`,
/// `metadata`. `instance_id` additionally breaks ties when two writers
/// produce the same `calculated_at` for the same logical key.
#[derive(Debug, Clone)]
pub struct L2Row {
    pub id: Option<i64>,
    pub key: FeatureKey,
    pub value: FeatureValue,
    pub instance_id: Uuid,
    pub superseded: bool,
}

impl L2Row {
    pub fn new(key: FeatureKey, value: FeatureValue, instance_id: Uuid) -> Self {
        Self { id: None, key, value, instance_id, superseded: false }
    }
}

/// Durable, time-indexed store. Primary access index is conceptually
/// `(ticker, feature_name, as_of DESC)`; implementations should keep
/// `scan` efficient under that ordering.
#[async_trait]
pub trait L2Store: Send + Sync {
    /// Single round-trip batch lookup. Rows marked superseded are treated
    /// as absent — an `invalidate` forces the next read to recompute.
    async fn get_many(&self, keys: &[FeatureKey]) -> RepositoryResult<HashMap<FeatureKey, FeatureValue>>;

    /// Upsert on the `(ticker, feature_name, as_of, version)` uniqueness
    /// constraint. An existing row is overwritten only if the new
    /// `calculated_at` is strictly greater, or equal with a lexicographically
    /// greater `instance_id` (deterministic tie-break, see DESIGN.md).
    async fn put_many(&self, rows: Vec<L2Row>) -> RepositoryResult<()>;

    /// Time-range scan for backfill/reporting. `end` is exclusive on
    /// `as_of` when `end <= start` would otherwise be ambiguous; callers
    /// pass an inclusive `[start, end]` range.
    async fn scan(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>), version: u32) -> RepositoryResult<Vec<L2Row>>;

    /// Mark all rows for `(ticker, feature_name)` within `as_of_range` as
    /// superseded. Returns the count affected. Does not delete rows — they
    /// remain available to `scan` for audit purposes.
    async fn invalidate_range(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>)) -> RepositoryResult<usize>;
}
