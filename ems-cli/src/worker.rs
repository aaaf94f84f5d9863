//! Hidden worker entry point: what the supervisor actually re-execs for
//! each `.jobs` file. Each invocation gets its own fresh `EventStore`,
//! matching the original project's per-child-process event list.

use std::path::Path;

use ems_common::error::EmsError;

/// Runs one stream worker pool against `jobs_path`/`out_path`. `args` is
/// the tail after the [`crate::WORKER_ENTRY_POINT`] sentinel:
/// `<jobs_path> <out_path> <threads> <delay_ms>`.
pub fn run(args: &[String]) -> Result<(), EmsError> {
    let [jobs_path, out_path, threads, delay_ms] = args else {
        return Err(EmsError::Usage(
            "--worker requires <jobs_path> <out_path> <threads> <delay_ms>".to_string(),
        ));
    };

    let threads: usize = threads
        .parse()
        .map_err(|_| EmsError::Usage(format!("invalid worker thread count: {threads}")))?;
    let delay_ms: u64 = delay_ms
        .parse()
        .map_err(|_| EmsError::Usage(format!("invalid worker delay: {delay_ms}")))?;

    ems_exec::run_stream(Path::new(jobs_path), Path::new(out_path), threads, delay_ms)
}
