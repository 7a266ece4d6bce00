//! In-memory [`L2Store`] — used by tests and by embedders who do not need
//! durability across process restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feature_store_core::{FeatureKey, FeatureValue};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::traits::{L2Row, L2Store};
use crate::RepositoryResult;

#[derive(Default)]
pub struct InMemoryL2Store {
    rows: Arc<RwLock<HashMap<FeatureKey, L2Row>>>,
}

impl InMemoryL2Store {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl L2Store for InMemoryL2Store {
    async fn get_many(&self, keys: &[FeatureKey]) -> RepositoryResult<HashMap<FeatureKey, FeatureValue>> {
        let rows = self.rows.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| rows.get(k).filter(|r| !r.superseded).map(|r| (k.clone(), r.value.clone())))
            .collect())
    }

    async fn put_many(&self, new_rows: Vec<L2Row>) -> RepositoryResult<()> {
        let mut rows = self.rows.write().await;
        for row in new_rows {
            match rows.get(&row.key) {
                Some(existing) if !supersedes(existing, &row) => continue,
                _ => {
                    rows.insert(row.key.clone(), row);
                }
            }
        }
        Ok(())
    }

    async fn scan(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>), version: u32) -> RepositoryResult<Vec<L2Row>> {
        let rows = self.rows.read().await;
        let (start, end) = as_of_range;
        let mut matched: Vec<L2Row> = rows
            .values()
            .filter(|r| {
                r.key.ticker == ticker
                    && r.key.feature_name == feature_name
                    && r.key.version == version
                    && r.key.as_of() >= start
                    && r.key.as_of() <= end
            })
            .cloned()
            .collect();
        // Matches the primary access index `(ticker, feature_name, as_of DESC)`
        // (spec.md §4.4, §6), same ordering `PostgresL2Store::scan` produces
        // via `ORDER BY as_of DESC`.
        matched.sort_by_key(|r| std::cmp::Reverse(r.key.as_of()));
        Ok(matched)
    }

    async fn invalidate_range(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>)) -> RepositoryResult<usize> {
        let mut rows = self.rows.write().await;
        let (start, end) = as_of_range;
        let mut count = 0;
        for row in rows.values_mut() {
            if row.key.ticker == ticker && row.key.feature_name == feature_name && row.key.as_of() >= start && row.key.as_of() <= end && !row.superseded {
                row.superseded = true;
                count += 1;
            }
        }
        Ok(count)
    }
}

/// `true` if `incoming` should replace `existing` under the strictly-greater
/// `calculated_at`, tie-broken by `instance_id`, rule from DESIGN.md.
fn supersedes(existing: &L2Row, incoming: &L2Row) -> bool {
    (incoming.value.calculated_at, incoming.instance_id) > (existing.value.calculated_at, existing.instance_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use feature_store_core::{SourceTier, TtlClass, Value};

    fn key(as_of: DateTime<Utc>) -> FeatureKey {
        FeatureKey::new("AAPL", "ret_5d", as_of, TtlClass::Daily, 1).unwrap()
    }

    fn value_at(calculated_at: DateTime<Utc>, v: f64) -> FeatureValue {
        FeatureValue::present(v, calculated_at, SourceTier::Computed, Value::empty_object())
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryL2Store::new();
        let as_of = Utc.with_ymd_and_hms(2024, 11, 8, 0, 0, 0).unwrap();
        let k = key(as_of);
        let row = L2Row::new(k.clone(), value_at(Utc::now(), 0.05), Uuid::new_v4());
        store.put_many(vec![row]).await.unwrap();

        let got = store.get_many(&[k.clone()]).await.unwrap();
        assert_eq!(got.get(&k).unwrap().value.as_f64(), Some(0.05));
    }

    #[tokio::test]
    async fn newer_calculated_at_wins() {
        let store = InMemoryL2Store::new();
        let as_of = Utc.with_ymd_and_hms(2024, 11, 8, 0, 0, 0).unwrap();
        let k = key(as_of);
        let t0 = Utc::now();
        store.put_many(vec![L2Row::new(k.clone(), value_at(t0, 1.0), Uuid::new_v4())]).await.unwrap();
        store.put_many(vec![L2Row::new(k.clone(), value_at(t0 + Duration::seconds(1), 2.0), Uuid::new_v4())]).await.unwrap();
        // stale write after the fact must not regress the value
        store.put_many(vec![L2Row::new(k.clone(), value_at(t0, 3.0), Uuid::new_v4())]).await.unwrap();

        let got = store.get_many(&[k.clone()]).await.unwrap();
        assert_eq!(got.get(&k).unwrap().value.as_f64(), Some(2.0));
    }

    #[tokio::test]
    async fn invalidate_hides_row_from_get_many() {
        let store = InMemoryL2Store::new();
        let as_of = Utc.with_ymd_and_hms(2024, 11, 8, 0, 0, 0).unwrap();
        let k = key(as_of);
        store.put_many(vec![L2Row::new(k.clone(), value_at(Utc::now(), 1.0), Uuid::new_v4())]).await.unwrap();

        let removed = store.invalidate_range("AAPL", "ret_5d", (as_of - Duration::days(1), as_of + Duration::days(1))).await.unwrap();
        assert_eq!(removed, 1);

        let got = store.get_many(&[k.clone()]).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn scan_orders_rows_by_as_of_descending() {
        let store = InMemoryL2Store::new();
        let day = |d: u32| key(Utc.with_ymd_and_hms(2024, 11, d, 0, 0, 0).unwrap());

        // Inserted out of order; `scan` must still come back newest-first.
        store.put_many(vec![L2Row::new(day(5), value_at(Utc::now(), 1.0), Uuid::new_v4())]).await.unwrap();
        store.put_many(vec![L2Row::new(day(8), value_at(Utc::now(), 2.0), Uuid::new_v4())]).await.unwrap();
        store.put_many(vec![L2Row::new(day(1), value_at(Utc::now(), 3.0), Uuid::new_v4())]).await.unwrap();

        let rows = store
            .scan("AAPL", "ret_5d", (Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap(), Utc.with_ymd_and_hms(2024, 11, 30, 0, 0, 0).unwrap()), 1)
            .await
            .unwrap();

        let as_ofs: Vec<_> = rows.iter().map(|r| r.key.as_of()).collect();
        let mut sorted = as_ofs.clone();
        sorted.sort_by_key(|t| std::cmp::Reverse(*t));
        assert_eq!(as_ofs, sorted);
        assert_eq!(as_ofs.len(), 3);
    }
}
