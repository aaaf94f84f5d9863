//! Structured logging setup for the supervisor and its worker processes.
//!
//! Diagnostics go through `tracing` to stderr, keeping `.out` files
//! reserved exclusively for SHOW/LIST command output.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber writing to stderr. Safe to call
/// more than once per process; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// A poisoned mutex means a previous panic left shared EMS state in an
/// unknown configuration. Per the lock-hierarchy invariant, this must
/// never be silently tolerated: log and abort the process rather than
/// attempt to continue with possibly-torn state.
pub fn abort_on_poison(context: &str) -> ! {
    tracing::error!(context, "fatal lock error: aborting process");
    std::process::abort();
}
