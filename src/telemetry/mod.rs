//! Tracing initialization for the client binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Configure with RUST_LOG, e.g.:
/// RUST_LOG=info,sabueso_client=debug
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sabueso_client=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .init();
}
