//! Tracing subscriber setup for host applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global fmt subscriber at the given level, honoring `RUST_LOG`
/// when it is set. Call once at startup; hosts that already install their
/// own subscriber should skip this.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
