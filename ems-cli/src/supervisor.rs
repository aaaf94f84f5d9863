//! Directory scan and process fanout: one worker process per `.jobs`
//! file, bounded to `MAX_PROC` concurrent children.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::ExitStatus;
use std::thread;
use std::time::Duration;

use ems_common::error::EmsError;
use ems_common::RunConfig;

use crate::cli::Cli;
use crate::WORKER_ENTRY_POINT;

/// Entry point for the supervisor role: `args` is the raw argv tail
/// (everything but the program name), in the fixed positional order
/// `<jobs_dir> <MAX_PROC> <MAX_THREADS> [state_access_delay_ms]`.
pub fn run(args: &[String]) -> Result<(), EmsError> {
    let cli = Cli::parse_tail(args).map_err(|err| EmsError::Usage(err.to_string()))?;
    let config = RunConfig::from_args(&cli.into_args())?;
    let exe = std::env::current_exe()?;

    let mut jobs_files = list_jobs_files(Path::new(&config.jobs_dir))?;
    jobs_files.sort();

    let mut children: Vec<(Child, PathBuf)> = Vec::with_capacity(config.max_proc);

    for jobs_path in jobs_files {
        if children.len() >= config.max_proc {
            reap_one(&mut children)?;
        }

        let out_path = jobs_path.with_file_name(out_file_name(&jobs_path));
        tracing::info!(jobs = %jobs_path.display(), out = %out_path.display(), "spawning worker");

        let child = spawn_worker(
            &exe,
            &jobs_path,
            &out_path,
            config.max_threads,
            config.state_access_delay_ms,
        )?;
        children.push((child, jobs_path));
    }

    while !children.is_empty() {
        reap_one(&mut children)?;
    }

    Ok(())
}

/// Entries whose name contains the substring `.jobs` (not a suffix
/// check: `foo.jobsX` counts too, matching the original discovery rule).
fn list_jobs_files(dir: &Path) -> Result<Vec<PathBuf>, EmsError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if name_contains_jobs(&path) {
            found.push(path);
        }
    }
    Ok(found)
}

fn name_contains_jobs(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.contains(".jobs"))
}

/// Same stem as the `.jobs` input, `.out` extension. When the name ends
/// with the literal `.jobs` suffix the suffix is stripped before
/// appending `.out`; a substring-only match (`foo.jobsX`) instead gets
/// `.out` appended to the whole name, avoiding a corrupted stem.
fn out_file_name(jobs_path: &Path) -> String {
    let name = jobs_path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    match name.strip_suffix(".jobs") {
        Some(stem) => format!("{stem}.out"),
        None => format!("{name}.out"),
    }
}

fn spawn_worker(
    exe: &Path,
    jobs_path: &Path,
    out_path: &Path,
    max_threads: usize,
    state_access_delay_ms: u64,
) -> Result<Child, EmsError> {
    Command::new(exe)
        .arg(WORKER_ENTRY_POINT)
        .arg(jobs_path)
        .arg(out_path)
        .arg(max_threads.to_string())
        .arg(state_access_delay_ms.to_string())
        .spawn()
        .map_err(EmsError::from)
}

/// Blocks until any queued child exits, removes it, and reports its
/// status. `std` has no "wait for any child" primitive (unlike the
/// original's `wait(&status)`), so this polls every live child with a
/// non-blocking `try_wait` until one has exited.
fn reap_one(children: &mut Vec<(Child, PathBuf)>) -> Result<(), EmsError> {
    loop {
        for i in 0..children.len() {
            if let Some(status) = children[i].0.try_wait()? {
                let (_, jobs_path) = children.remove(i);
                report_exit(&jobs_path, status);
                return Ok(());
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn report_exit(jobs_path: &Path, status: ExitStatus) {
    if status.success() {
        tracing::info!(jobs = %jobs_path.display(), "worker finished");
    } else {
        tracing::warn!(jobs = %jobs_path.display(), %status, "worker exited with failure");
    }
}
