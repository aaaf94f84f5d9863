//! Per-stream command dispatcher and worker pool: the engine that drives
//! one `.jobs` file's command stream across a fixed team of threads,
//! restarting the team at each `BARRIER`.

pub mod dispatcher;
pub mod pool;

pub use dispatcher::run_thread;
pub use dispatcher::StreamContext;
pub use dispatcher::ThreadOutcome;
pub use dispatcher::WaitState;
pub use pool::run_stream;
