//! Typed run configuration assembled from the supervisor's positional
//! CLI arguments.

use crate::error::EmsError;

/// Default simulated state-access delay, matching the upstream project's
/// compile-time default used when the optional fourth argument is absent.
pub const DEFAULT_STATE_ACCESS_DELAY_MS: u64 = 0;

/// Validated configuration for one supervisor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub jobs_dir: String,
    pub max_proc: usize,
    pub max_threads: usize,
    pub state_access_delay_ms: u64,
}

impl RunConfig {
    /// Builds a [`RunConfig`] from already-split positional arguments,
    /// validating argument count before parsing any value (see
    /// `SPEC_FULL.md` §9: argument-count validation must happen first).
    pub fn from_args(args: &[String]) -> Result<Self, EmsError> {
        if args.len() < 3 {
            return Err(EmsError::Usage(
                "usage: <jobs_dir> <MAX_PROC> <MAX_THREADS> [state_access_delay_ms]".to_string(),
            ));
        }

        let jobs_dir = args[0].clone();

        let max_proc = args[1]
            .parse::<usize>()
            .map_err(|_| EmsError::Usage(format!("invalid MAX_PROC: {}", args[1])))?;
        let max_threads = args[2]
            .parse::<usize>()
            .map_err(|_| EmsError::Usage(format!("invalid MAX_THREADS: {}", args[2])))?;

        if max_proc == 0 || max_threads == 0 {
            return Err(EmsError::Usage(
                "MAX_PROC and MAX_THREADS must be positive".to_string(),
            ));
        }

        let state_access_delay_ms = match args.get(3) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| EmsError::Usage(format!("invalid delay value: {raw}")))?,
            None => DEFAULT_STATE_ACCESS_DELAY_MS,
        };

        Ok(Self {
            jobs_dir,
            max_proc,
            max_threads,
            state_access_delay_ms,
        })
    }
}
