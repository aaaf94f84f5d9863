//! Supervisor binary support library: directory scan, process fanout and
//! reaping, and the hidden worker entry point re-exec dispatches to.

pub mod cli;
pub mod supervisor;
pub mod worker;

/// Argv[1] sentinel that routes `main` to [`worker::run`] instead of
/// [`supervisor::run`]. Never documented in the public usage text; this
/// is how one binary plays both the supervisor and a worker process.
pub const WORKER_ENTRY_POINT: &str = "--worker";
