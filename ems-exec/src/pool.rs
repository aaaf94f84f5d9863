//! Stream worker pool: spawns a team of dispatcher threads over one
//! `.jobs`/`.out` pair, and restarts the team whenever a thread reports
//! `BARRIER`, without requiring a latch/phaser primitive — the drain and
//! relaunch IS the rendezvous.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Mutex;
use std::thread;

use ems_common::error::EmsError;
use ems_common::logging::abort_on_poison;
use ems_core::EventStore;
use ems_core::OutputWriter;

use crate::dispatcher::run_thread;
use crate::dispatcher::StreamContext;
use crate::dispatcher::ThreadOutcome;
use crate::dispatcher::WaitState;

/// Opens `jobs_path` for reading and creates/truncates `out_path`, then
/// drives its command stream to completion with `max_threads` dispatcher
/// threads per pool generation.
pub fn run_stream(
    jobs_path: &Path,
    out_path: &Path,
    max_threads: usize,
    state_access_delay_ms: u64,
) -> Result<(), EmsError> {
    let jobs_file = File::open(jobs_path)?;
    let out_file = File::create(out_path)?;

    let store = EventStore::new(state_access_delay_ms);
    let writer = OutputWriter::new(out_file);
    let reader = Mutex::new(BufReader::new(jobs_file));

    loop {
        let ctx = StreamContext {
            reader: &reader,
            writer: &writer,
            wait_state: Mutex::new(WaitState::new(max_threads)),
            max_threads,
        };

        let outcomes = run_one_generation(&ctx, &store, max_threads);

        if outcomes.iter().all(|o| *o == ThreadOutcome::Eoc) {
            store.terminate()?;
            return Ok(());
        }
        // At least one thread hit BARRIER: every thread has finished its
        // in-flight command and returned by now (the join above waited
        // for all of them), so it is safe to drop this generation's
        // wait_state and relaunch a fresh team on the same reader/writer.
    }
}

fn run_one_generation(
    ctx: &StreamContext<'_, BufReader<File>, File>,
    store: &EventStore,
    max_threads: usize,
) -> Vec<ThreadOutcome> {
    thread::scope(|scope| {
        let handles: Vec<_> = (1..=max_threads)
            .map(|thread_id| scope.spawn(move || run_thread(ctx, thread_id, store)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| abort_on_poison("dispatcher thread panicked"))
            })
            .collect()
    })
}
