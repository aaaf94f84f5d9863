//! Public argument grammar for the supervisor role, parsed with `clap`
//! the way the rest of the workspace's tooling crates do. Values are
//! kept as strings here and handed to [`ems_common::RunConfig::from_args`]
//! for the numeric/count validation, so the two layers don't duplicate
//! each other's error messages.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "ems",
    about = "Event management service: runs one worker process per .jobs file in a directory",
    version
)]
pub struct Cli {
    /// Directory to scan for job files (entries whose name contains `.jobs`).
    pub jobs_dir: String,

    /// Maximum number of worker processes running at once.
    pub max_proc: String,

    /// Number of dispatcher threads per worker process.
    pub max_threads: String,

    /// Optional simulated per-access delay in milliseconds.
    pub state_access_delay_ms: Option<String>,
}

impl Cli {
    /// Parses `args` (the argv tail, no program name) into a [`Cli`].
    pub fn parse_tail(args: &[String]) -> Result<Self, clap::Error> {
        Self::try_parse_from(std::iter::once("ems".to_string()).chain(args.iter().cloned()))
    }

    /// Flattens back into the positional string vector `RunConfig::from_args`
    /// expects.
    pub fn into_args(self) -> Vec<String> {
        let mut flat = vec![self.jobs_dir, self.max_proc, self.max_threads];
        if let Some(delay) = self.state_access_delay_ms {
            flat.push(delay);
        }
        flat
    }
}
