//! Log subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a stdout subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
