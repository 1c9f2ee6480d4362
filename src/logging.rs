//! Structured logging.
//!
//! Installs a `tracing-subscriber` formatter. `RUST_LOG` takes precedence over the configured
//! default level.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// Returns false if a subscriber was already installed, in which case nothing changes.
pub fn init(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    #[test]
    fn second_init_is_a_noop() {
        super::init("debug");
        assert!(!super::init("info"));
    }
}
