//! [`FeatureStoreConfig`] — the enumerated configuration knobs of spec.md
//! §6, loaded the way `feature-store-server`'s `ServerConfig` does (file,
//! then environment with a prefix, then these defaults).

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Tunable knobs governing TTL policy, singleflight behavior, and
/// backpressure thresholds. All fields have the spec.md §6 defaults;
/// embedders override only what they need via the individual `with_*`
/// builder methods or by deserializing a config file/environment layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureStoreConfig {
    /// L1 TTL for `ttl_class = intraday` features. Default 300s.
    #[serde(with = "duration_secs")]
    pub ttl_intraday: Duration,

    /// L1 TTL for `ttl_class = daily` features. Default 86,400s.
    #[serde(with = "duration_secs")]
    pub ttl_daily: Duration,

    /// Upper bound on the L1 TTL used for `ttl_class = static` features —
    /// static features still expire eventually so silent upstream
    /// corrections are picked up. Default 86,400s.
    #[serde(with = "duration_secs")]
    pub ttl_static_max: Duration,

    /// Max hold time for the Singleflight Coordinator's cross-process
    /// distributed lock. Default 30s.
    #[serde(with = "duration_secs")]
    pub singleflight_lock_ttl: Duration,

    /// Max time a caller that failed to acquire the distributed lock waits
    /// for a peer's result before falling back to its own compute.
    /// Default equal to `singleflight_lock_ttl` (30s).
    #[serde(with = "duration_secs")]
    pub singleflight_poll_deadline: Duration,

    /// Max concurrent computes on the compute worker pool. Default
    /// `#cores`.
    pub compute_pool_size: usize,

    /// Bound on the in-memory retry buffer used when L2 writes fail.
    /// Oldest entries are dropped on overflow. Default 10,000.
    pub l2_retry_buffer_size: usize,

    /// Bound on pending computes before `get_features` fails fast with
    /// `Overloaded`. Default 10x `compute_pool_size`.
    pub pending_compute_buffer: usize,

    /// Fraction of a feature's normal TTL used to cache an `Absent` result
    /// arising from `InsufficientData`, subject to a 60s floor. Default
    /// 0.1.
    pub absent_ttl_fraction: f64,
}

impl FeatureStoreConfig {
    /// The floor under `absent_ttl_fraction * ttl`, per spec.md §4.5.
    pub const ABSENT_TTL_FLOOR: Duration = Duration::from_secs(60);

    pub fn absent_ttl_for(&self, normal_ttl: Duration) -> Duration {
        normal_ttl.mul_f64(self.absent_ttl_fraction).max(Self::ABSENT_TTL_FLOOR)
    }

    pub fn with_ttl_intraday(mut self, ttl: Duration) -> Self {
        self.ttl_intraday = ttl;
        self
    }

    pub fn with_ttl_daily(mut self, ttl: Duration) -> Self {
        self.ttl_daily = ttl;
        self
    }

    pub fn with_compute_pool_size(mut self, size: usize) -> Self {
        self.compute_pool_size = size;
        self.pending_compute_buffer = size * 10;
        self
    }
}

impl Default for FeatureStoreConfig {
    fn default() -> Self {
        let compute_pool_size = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self {
            ttl_intraday: secs(300),
            ttl_daily: secs(86_400),
            ttl_static_max: secs(86_400),
            singleflight_lock_ttl: secs(30),
            singleflight_poll_deadline: secs(30),
            compute_pool_size,
            l2_retry_buffer_size: 10_000,
            pending_compute_buffer: compute_pool_size * 10,
            absent_ttl_fraction: 0.1,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = FeatureStoreConfig::default();
        assert_eq!(cfg.ttl_intraday, secs(300));
        assert_eq!(cfg.ttl_daily, secs(86_400));
        assert_eq!(cfg.ttl_static_max, secs(86_400));
        assert_eq!(cfg.singleflight_lock_ttl, secs(30));
        assert_eq!(cfg.singleflight_poll_deadline, secs(30));
        assert_eq!(cfg.l2_retry_buffer_size, 10_000);
        assert_eq!(cfg.pending_compute_buffer, cfg.compute_pool_size * 10);
        assert!((cfg.absent_ttl_fraction - 0.1).abs() < 1e-9);
    }

    #[test]
    fn absent_ttl_applies_floor() {
        let cfg = FeatureStoreConfig::default();
        // 0.1 * 100s = 10s, below the 60s floor.
        assert_eq!(cfg.absent_ttl_for(secs(100)), FeatureStoreConfig::ABSENT_TTL_FLOOR);
        // 0.1 * 3600s = 360s, above the floor.
        assert_eq!(cfg.absent_ttl_for(secs(3600)), secs(360));
    }

    #[test]
    fn with_compute_pool_size_rescales_pending_buffer() {
        let cfg = FeatureStoreConfig::default().with_compute_pool_size(8);
        assert_eq!(cfg.compute_pool_size, 8);
        assert_eq!(cfg.pending_compute_buffer, 80);
    }
}
