//! Tracing setup for applications embedding the engine.

use tracing_subscriber::EnvFilter;

/// Initializes a global tracing subscriber.
///
/// Respects `RUST_LOG` when set, falling back to the given filter
/// directive. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("info");
        init_tracing("debug");
        // Second call must not panic.
    }
}
