//! Tracing subscriber setup.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

static INIT: Once = Once::new();

/// Installs the global subscriber.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]. With `json`
/// set, every event is written as one JSON object per line. Calling this
/// more than once is a no-op.
pub fn init_tracing(json: bool) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = if json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .try_init()
        } else {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr).with_target(false))
                .try_init()
        };

        if installed.is_err() {
            tracing::debug!("Global subscriber already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false);
        init_tracing(true);
        tracing::info!(scenario = "smoke", "logging initialized");
    }
}
