//! `tracing` subscriber initialization, shared by the server binary and by
//! integration tests that want log output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize a global `tracing` subscriber reading `RUST_LOG`, defaulting
/// to `info` for this crate's own spans if unset. Safe to call more than
/// once in a test process — later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init();
}
