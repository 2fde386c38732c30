use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub const DEFAULT_FILTER: &str = "info";

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    init_logging_with(DEFAULT_FILTER)
}

pub fn init_logging_with(default_filter: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        // another subscriber may have won the race; keep it
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
