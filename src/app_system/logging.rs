use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the `info` default.
///
/// # Panics
/// If a global subscriber is already installed; use [`try_setup_tracing`] from tests.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}

/// Like [`setup_tracing`] but returns `false` instead of panicking when a
/// subscriber is already in place.
pub fn try_setup_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init()
        .is_ok()
}
