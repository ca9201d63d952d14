use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// The filter is read from `FOLIO_LOG`, then `RUST_LOG`, and falls back to
/// `info`. Safe to call more than once.
pub fn init() {
    INIT.call_once(|| {
        let filter = std::env::var("FOLIO_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt().with_env_filter(filter).with_target(false).try_init().ok();
    });
}
