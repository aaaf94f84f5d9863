//! Supervisor binary entry point. Ordinary invocations run the
//! supervisor; a hidden `--worker` argv form re-execs into a single
//! stream worker pool (see `ems_cli::WORKER_ENTRY_POINT`).

fn main() -> anyhow::Result<()> {
    ems_common::logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some(ems_cli::WORKER_ENTRY_POINT) {
        args.remove(0);
        ems_cli::worker::run(&args)?;
        return Ok(());
    }

    ems_cli::supervisor::run(&args)?;
    Ok(())
}
