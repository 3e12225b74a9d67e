//! Tracing bootstrap for hosts embedding the core.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive, e.g. `relaxmax_core=debug`.
pub const LOG_ENV: &str = "RELAXMAX_LOG";

/// Install a formatting subscriber filtered by `RELAXMAX_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
