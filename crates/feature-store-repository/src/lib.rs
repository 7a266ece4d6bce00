//! L2 Store (C4) — the Feature Store's durable, time-indexed tier.
//!
//! Each row records `(ticker, feature_name, as_of, version, value,
//! calculated_at, metadata)` under a uniqueness constraint on
//! `(ticker, feature_name, as_of, version)`. The primary access index is
//! `(ticker, feature_name, as_of DESC)`, used by [`traits::L2Store::scan`]
//! for backfill and reporting.
//!
//! - [`traits::L2Store`] — the durable-store interface the Facade depends on
//! - [`memory::InMemoryL2Store`] — a process-local implementation for tests
//!   and embedders that do not need durability across restarts
//! - [`postgres::PostgresL2Store`] (behind the `postgres` feature) — the
//!   production-grade implementation
//!
//! ```no_run
//! use feature_store_repository::{InMemoryL2Store, L2Store};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InMemoryL2Store::new();
//!     let _ = store.get_many(&[]).await;
//! }
//! ```

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryL2Store;
pub use traits::{L2Row, L2Store};

#[cfg(feature = "postgres")]
pub use postgres::PostgresL2Store;
