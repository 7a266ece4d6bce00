//! Feature Store Facade (C7) — the public entry point. Orchestrates
//! lookup -> L1 -> L2 -> compute -> backfill and exposes `get_features`,
//! `warm`, and `invalidate` (spec.md §4.7, §6).

use crate::config::FeatureStoreConfig;
use crate::error::{Result, SdkError};
use crate::retry_buffer::L2RetryBuffer;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use feature_store_core::{FeatureKey, FeatureValue, ScalarValue, SourceTier, Value};
use feature_store_repository::{L2Row, L2Store};
use feature_store_runtime::{CostTracker, FeatureRegistry, L1Cache, RawDataGateway, RawDataProvider, RequestTier, RuntimeError, SingleflightCoordinator};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-call options, mirroring spec.md §6's `options?` shape.
#[derive(Debug, Clone, Default)]
pub struct GetFeaturesOptions {
    /// `Some(Duration::ZERO)` disables L1 entirely for this call: the L1
    /// read is treated as a miss and the L1 write is skipped, while L2 is
    /// still read and written. Supports the "always recompute but
    /// remember" testing mode spec.md §4.7 describes.
    pub ttl_override: Option<Duration>,
    /// When a deadline expires or a per-feature error occurs, return
    /// whatever already resolved plus a per-feature error map instead of
    /// failing the whole call.
    pub partial: bool,
    /// Wall-clock budget for this call. `None` means no deadline.
    pub deadline: Option<Duration>,
}

/// Per-call telemetry, returned alongside the feature map (spec.md §6).
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub computed: usize,
    pub latency_ms: u64,
    pub source_per_feature: HashMap<String, SourceTier>,
}

/// Result of [`FeatureStore::get_features`].
#[derive(Debug, Default)]
pub struct FeatureBatch {
    pub features: HashMap<String, ScalarValue>,
    /// Populated only in `partial` mode, for names that could not be
    /// resolved before the call returned.
    pub errors: HashMap<String, SdkError>,
    pub telemetry: Telemetry,
}

/// Result of [`FeatureStore::warm`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WarmReport {
    pub warmed: usize,
    pub failed: usize,
}

struct ResolvedFeature {
    name: String,
    defn: Arc<feature_store_core::FeatureDefinition>,
    key: FeatureKey,
    encoded: String,
}

/// The public Feature Store handle. Cheap to clone (every field is an
/// `Arc`), so embedders share one instance across tasks; no request-level
/// state outlives a single `get_features`/`warm`/`invalidate` call.
pub struct FeatureStore<P: RawDataProvider + 'static> {
    pub(crate) registry: Arc<FeatureRegistry>,
    pub(crate) l1: Arc<dyn L1Cache>,
    pub(crate) l2: Arc<dyn L2Store>,
    pub(crate) gateway: Arc<RawDataGateway<P>>,
    pub(crate) singleflight: Arc<SingleflightCoordinator<FeatureValue, Arc<SdkError>>>,
    pub(crate) cost_tracker: Arc<CostTracker>,
    pub(crate) config: FeatureStoreConfig,
    pub(crate) instance_id: Uuid,
    pub(crate) pending_permits: Arc<Semaphore>,
    pub(crate) compute_permits: Arc<Semaphore>,
    pub(crate) retry_buffer: Arc<L2RetryBuffer>,
}

impl<P: RawDataProvider + 'static> Clone for FeatureStore<P> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            l1: self.l1.clone(),
            l2: self.l2.clone(),
            gateway: self.gateway.clone(),
            singleflight: self.singleflight.clone(),
            cost_tracker: self.cost_tracker.clone(),
            config: self.config.clone(),
            instance_id: self.instance_id,
            pending_permits: self.pending_permits.clone(),
            compute_permits: self.compute_permits.clone(),
            retry_buffer: self.retry_buffer.clone(),
        }
    }
}

impl<P: RawDataProvider + 'static> FeatureStore<P> {
    /// The base L1 TTL for a `ttl_class`, before any `ttl_override` or
    /// `absent` shortening is applied.
    fn base_ttl(&self, ttl_class: feature_store_core::TtlClass) -> Duration {
        match ttl_class {
            feature_store_core::TtlClass::Intraday => self.config.ttl_intraday,
            feature_store_core::TtlClass::Daily => self.config.ttl_daily,
            feature_store_core::TtlClass::Static => self.config.ttl_static_max,
        }
    }

    fn l1_ttl_for(&self, ttl_class: feature_store_core::TtlClass, value: &FeatureValue, ttl_override: Option<Duration>) -> Duration {
        if let Some(ttl) = ttl_override {
            if !ttl.is_zero() {
                return ttl;
            }
        }
        let base = self.base_ttl(ttl_class);
        if value.is_absent() {
            self.config.absent_ttl_for(base)
        } else {
            base
        }
    }

    /// Public entry point: `get_features(ticker, as_of, feature_names, options)`.
    ///
    /// Algorithm (spec.md §4.7): resolve names via the Registry, normalize
    /// `as_of` per feature, probe L1 then L2, dedupe remaining compute via
    /// Singleflight, assemble results in request order.
    pub async fn get_features(
        &self,
        ticker: &str,
        as_of: DateTime<Utc>,
        feature_names: &[String],
        options: GetFeaturesOptions,
    ) -> Result<FeatureBatch> {
        let started = Instant::now();
        let l1_disabled = matches!(options.ttl_override, Some(d) if d.is_zero());

        // 1 & 2 & 3: resolve definitions, normalize as_of, build keys,
        // deduplicating requested names (two entries for the same name
        // collapse into one unit of work — the result is a map by name).
        let mut seen = std::collections::HashSet::new();
        let mut resolved = Vec::new();
        for name in feature_names {
            if !seen.insert(name.clone()) {
                continue;
            }
            let defn = self.registry.lookup(name, 0).map_err(|e| match e {
                RuntimeError::UnknownFeature(n) => SdkError::UnknownFeature(n),
                other => SdkError::Runtime(other),
            })?;
            let key = FeatureKey::new(ticker, name, as_of, defn.ttl_class, defn.version).map_err(RuntimeError::from)?;
            resolved.push(ResolvedFeature { name: name.clone(), defn: Arc::new(defn.clone()), key: key.clone(), encoded: key.encode(defn.ttl_class) });
        }

        let mut telemetry = Telemetry::default();
        let mut features: HashMap<String, ScalarValue> = HashMap::new();
        let mut errors: HashMap<String, SdkError> = HashMap::new();

        // 4. Batch L1 probe. An unreachable L1 degrades to "every key is a
        // miss" rather than failing the call (spec.md §4.3, §4.7); the
        // `l1_unavailable` counter records the degradation.
        let l1_hits = if l1_disabled || resolved.is_empty() {
            HashMap::new()
        } else {
            let keys: Vec<String> = resolved.iter().map(|r| r.encoded.clone()).collect();
            match self.l1.get(&keys).await {
                Ok(hits) => hits,
                Err(e) => {
                    self.cost_tracker.record_l1_unavailable();
                    debug!(error = %e, "L1 unavailable, treating as miss for this batch");
                    HashMap::new()
                }
            }
        };

        let mut misses = Vec::new();
        for r in resolved {
            if let Some(v) = l1_hits.get(&r.encoded) {
                telemetry.cache_hits += 1;
                telemetry.source_per_feature.insert(r.name.clone(), SourceTier::L1);
                features.insert(r.name.clone(), v.value);
                self.cost_tracker.record_request(RequestTier::L1, started.elapsed());
            } else {
                telemetry.cache_misses += 1;
                misses.push(r);
            }
        }

        if misses.is_empty() {
            telemetry.latency_ms = started.elapsed().as_millis() as u64;
            return Ok(FeatureBatch { features, errors, telemetry });
        }

        // 5. Batch L2 probe for L1 misses.
        let miss_keys: Vec<FeatureKey> = misses.iter().map(|r| r.key.clone()).collect();
        let l2_hits = match self.l2.get_many(&miss_keys).await {
            Ok(m) => m,
            Err(e) => {
                self.cost_tracker.record_request(RequestTier::Absent, Duration::default());
                debug!(error = %e, "L2 unavailable, proceeding to compute");
                HashMap::new()
            }
        };

        let mut still_missing = Vec::new();
        for r in misses {
            if let Some(v) = l2_hits.get(&r.key) {
                let v = v.clone().with_source_tier(SourceTier::L2);
                telemetry.source_per_feature.insert(r.name.clone(), SourceTier::L2);
                features.insert(r.name.clone(), v.value);
                self.cost_tracker.record_request(RequestTier::L2, started.elapsed());

                if !l1_disabled {
                    let l1 = self.l1.clone();
                    let ttl = self.l1_ttl_for(r.defn.ttl_class, &v, options.ttl_override);
                    let encoded = r.encoded.clone();
                    tokio::spawn(async move {
                        if let Err(e) = l1.set(encoded, v, ttl).await {
                            debug!(error = %e, "L1 promotion write failed, value still served from L2");
                        }
                    });
                }
            } else {
                still_missing.push(r);
            }
        }

        if still_missing.is_empty() {
            telemetry.latency_ms = started.elapsed().as_millis() as u64;
            return Ok(FeatureBatch { features, errors, telemetry });
        }

        // Admission control: spec.md §5's `pending_compute_buffer` bound.
        // Checked up front for the whole batch so a caller either gets to
        // proceed or is told to back off immediately, rather than being
        // partially admitted.
        let _permit = match self.pending_permits.clone().try_acquire_many_owned(still_missing.len() as u32) {
            Ok(permit) => permit,
            Err(_) => return Err(SdkError::Overloaded),
        };

        // 6. Remaining misses go through Singleflight + compute.
        let mut handles = Vec::new();
        for r in still_missing {
            let store = self.clone();
            let l1_disabled_for_task = l1_disabled;
            let ttl_override = options.ttl_override;
            handles.push((r.name.clone(), tokio::spawn(async move { store.compute_and_cache(r, l1_disabled_for_task, ttl_override).await })));
        }

        let deadline = options.deadline;
        for (name, handle) in handles {
            let outcome = match deadline {
                Some(d) => match timeout(d, handle).await {
                    Ok(join_result) => join_result.map_err(|_| SdkError::Deadline),
                    Err(_) => {
                        // Caller unblocks; the spawned task keeps running
                        // to completion in the background (spec.md §5).
                        Ok(Err(SdkError::Deadline))
                    }
                },
                None => handle.await.map_err(|_| SdkError::Deadline),
            };

            match outcome.and_then(|inner| inner) {
                Ok(value) => {
                    telemetry.computed += 1;
                    telemetry.source_per_feature.insert(name.clone(), SourceTier::Computed);
                    self.cost_tracker.record_request(RequestTier::Computed, started.elapsed());
                    features.insert(name, value.value);
                }
                Err(e) => {
                    if options.partial {
                        errors.insert(name, e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        telemetry.latency_ms = started.elapsed().as_millis() as u64;
        Ok(FeatureBatch { features, errors, telemetry })
    }

    /// Fetch raw data, compute, and write back to L2/L1 for a single
    /// resolved feature, deduplicated through Singleflight. Invoked as a
    /// detached task from `get_features` so a caller's deadline expiry
    /// never aborts an in-flight compute other callers are waiting on.
    async fn compute_and_cache(&self, r: ResolvedFeature, l1_disabled: bool, ttl_override: Option<Duration>) -> Result<FeatureValue> {
        let lock_ttl = self.config.singleflight_lock_ttl;
        let acquired = self.singleflight.try_acquire_distributed(&r.encoded, lock_ttl).await;

        if !acquired {
            // Cross-process dedup: another instance may be computing this
            // key. Poll L1/L2 up to the poll deadline before falling back
            // to our own compute — a stuck peer lock must not halt
            // progress (spec.md §4.6).
            if let Some(v) = self.poll_peers(&r, l1_disabled).await {
                return Ok(v);
            }
        }

        let store = self.clone();
        let r_key = r.key.clone();
        let r_defn = r.defn.clone();
        let r_name = r.name.clone();
        let encoded = r.encoded.clone();

        let result = self
            .singleflight
            .do_once(&encoded, move || async move { store.run_compute(r_name, r_defn, r_key, l1_disabled, ttl_override).await.map_err(Arc::new) })
            .await;

        if acquired {
            self.singleflight.release_distributed(&r.encoded).await;
        }

        result.map_err(|e| Arc::try_unwrap(e).unwrap_or_else(|e| SdkError::Runtime(RuntimeError::Upstream(e.to_string()))))
    }

    /// Poll L1 then L2 for a key another instance may be computing, up to
    /// `singleflight_poll_deadline`. Returns `None` if the deadline
    /// elapses without the value appearing, in which case the caller
    /// falls back to computing it itself.
    async fn poll_peers(&self, r: &ResolvedFeature, l1_disabled: bool) -> Option<FeatureValue> {
        let deadline = Instant::now() + self.config.singleflight_poll_deadline;
        let mut interval = Duration::from_millis(50);
        while Instant::now() < deadline {
            if !l1_disabled {
                if let Ok(hits) = self.l1.get(&[r.encoded.clone()]).await {
                    if let Some(v) = hits.get(&r.encoded) {
                        return Some(v.clone());
                    }
                }
            }
            if let Ok(hits) = self.l2.get_many(&[r.key.clone()]).await {
                if let Some(v) = hits.get(&r.key) {
                    return Some(v.clone().with_source_tier(SourceTier::L2));
                }
            }
            tokio::time::sleep(interval.min(deadline.saturating_duration_since(Instant::now()))).await;
            interval = (interval * 2).min(Duration::from_secs(1));
        }
        None
    }

    async fn run_compute(&self, name: String, defn: Arc<feature_store_core::FeatureDefinition>, key: FeatureKey, l1_disabled: bool, ttl_override: Option<Duration>) -> Result<FeatureValue> {
        let _compute_permit = self.compute_permits.acquire().await.expect("compute semaphore never closed");

        let bars = match self.gateway.fetch_bars(&key.ticker, key.as_of(), defn.window_days).await {
            Ok(bars) => bars,
            Err(RuntimeError::InsufficientData { needed, got }) => {
                // Legitimate Absent, not an error (spec.md §4.5): cached
                // with a short TTL to avoid hot re-computation.
                let value = FeatureValue::absent(
                    Utc::now(),
                    SourceTier::Computed,
                    Value::object([("reason", Value::String("insufficient_data".to_string())), ("needed", Value::Number(needed as f64)), ("got", Value::Number(got as f64))]),
                );
                self.write_back(&name, &defn, &key, value.clone(), l1_disabled, ttl_override).await;
                return Ok(value);
            }
            Err(RuntimeError::UnknownTicker(t)) => return Err(SdkError::UnknownTicker(t)),
            Err(RuntimeError::Upstream(msg)) => return Err(SdkError::Upstream(msg)),
            Err(e) => return Err(SdkError::Runtime(e)),
        };

        self.cost_tracker.record_compute_run(&defn.name);
        self.cost_tracker.record_cost(defn.window_days as f64 * COST_PER_BAR_USD);
        let value = feature_store_runtime::compute::run(&defn, &bars);
        self.write_back(&name, &defn, &key, value.clone(), l1_disabled, ttl_override).await;
        Ok(value)
    }

    async fn write_back(&self, name: &str, defn: &feature_store_core::FeatureDefinition, key: &FeatureKey, value: FeatureValue, l1_disabled: bool, ttl_override: Option<Duration>) {
        let row = L2Row::new(key.clone(), value.clone(), self.instance_id);
        let l2_written = match self.l2.put_many(vec![row.clone()]).await {
            Ok(()) => true,
            Err(e) => {
                warn!(feature = name, error = %e, "L2 write failed, queuing for retry");
                self.retry_buffer.enqueue(row).await;
                false
            }
        };

        if l1_disabled {
            if !l2_written {
                self.cost_tracker.record_uncached_served();
            }
            return;
        }

        let ttl = self.l1_ttl_for(defn.ttl_class, &value, ttl_override);
        if let Err(e) = self.l1.set(key.encode(defn.ttl_class), value, ttl).await {
            debug!(feature = name, error = %e, "L1 write-back failed, value still durable in L2 (or queued for retry)");
        }
        if !l2_written {
            // Served and hot-cached, but not yet durable — counted the same
            // way spec.md §4.7 counts a fully uncached result, since a
            // process restart before the retry buffer flushes would lose
            // it. `uncached_served` and the retry buffer are independent:
            // the former is a point-in-time accounting signal, the latter
            // is what actually gets the row into L2 eventually.
            self.cost_tracker.record_uncached_served();
        }
    }

    /// Spawn a background task that periodically drains the L2 retry
    /// buffer. A no-op outside a Tokio runtime (e.g. a plain `#[test]`
    /// calling `build()` synchronously) so unit tests that never enter
    /// async context are unaffected.
    pub(crate) fn spawn_retry_buffer_flusher(&self, interval: Duration) {
        if tokio::runtime::Handle::try_current().is_err() {
            return;
        }
        let l2 = self.l2.clone();
        let retry_buffer = self.retry_buffer.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                retry_buffer.flush(&l2).await;
            }
        });
    }

    /// Best-effort population: same path as `get_features`, but per-key
    /// errors are swallowed rather than failing the call, and the wait on
    /// in-flight compute is capped by `singleflight_poll_deadline`.
    pub async fn warm(&self, tickers: &[String], feature_names: &[String], as_of: DateTime<Utc>) -> WarmReport {
        let mut report = WarmReport::default();
        let options = GetFeaturesOptions { ttl_override: None, partial: true, deadline: Some(self.config.singleflight_poll_deadline) };
        for ticker in tickers {
            match self.get_features(ticker, as_of, feature_names, options.clone()).await {
                Ok(batch) => {
                    report.warmed += batch.features.len();
                    report.failed += batch.errors.len();
                }
                Err(_) => report.failed += feature_names.len(),
            }
        }
        report
    }

    /// Invalidate entries for `(ticker, feature_name)` across `as_of_range`.
    /// Marks L2 rows superseded (forcing a recompute on next read) and
    /// best-effort evicts the corresponding L1 keys.
    pub async fn invalidate(&self, ticker: &str, feature_name: &str, as_of_range: (DateTime<Utc>, DateTime<Utc>)) -> Result<usize> {
        let defn = self.registry.lookup(feature_name, 0).map_err(|e| match e {
            RuntimeError::UnknownFeature(n) => SdkError::UnknownFeature(n),
            other => SdkError::Runtime(other),
        })?;
        let removed = self.l2.invalidate_range(ticker, feature_name, as_of_range).await?;

        // Daily/static classes normalize to a day boundary, so the range
        // enumerates to a bounded number of L1 keys. Intraday keys are
        // left to expire on their own short TTL rather than enumerating
        // every minute bucket in the range.
        if matches!(defn.ttl_class, feature_store_core::TtlClass::Daily | feature_store_core::TtlClass::Static) {
            let (start, end) = as_of_range;
            let mut day = start.date_naive();
            let last = end.date_naive();
            while day <= last {
                let as_of = day.and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc();
                if let Ok(key) = FeatureKey::new(ticker, feature_name, as_of, defn.ttl_class, defn.version) {
                    if let Err(e) = self.l1.delete(&key.encode(defn.ttl_class)).await {
                        debug!(ticker, feature_name, error = %e, "L1 eviction failed during invalidate, entry will expire by TTL");
                    }
                }
                day += ChronoDuration::days(1);
            }
        }

        info!(ticker, feature_name, removed, "invalidated feature range");
        Ok(removed)
    }

    pub fn cost_tracker(&self) -> &Arc<CostTracker> {
        &self.cost_tracker
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    pub fn retry_buffer(&self) -> &Arc<L2RetryBuffer> {
        &self.retry_buffer
    }
}

/// Flat per-bar cost estimate used for the `estimated_cost_usd_total`
/// accounting counter (spec.md §4.8). An accounting figure, not a
/// billing primitive — off-by-one is tolerable.
const COST_PER_BAR_USD: f64 = 0.0001;
