//! Per-thread command loop: barrier check, per-thread delay drain,
//! command read, dispatch. Every path releases the read lock before
//! calling into the event store, and the store itself never observes
//! `read_lock`/`wait_lock` held across its operations.

use std::io::BufRead;
use std::sync::Mutex;

use ems_common::logging::abort_on_poison;
use ems_core::EventStore;
use ems_core::OutputWriter;
use ems_parser::next_command;
use ems_parser::usage_text;
use ems_parser::Command;

/// Per-thread pending delay plus the barrier flag, guarded together by
/// one lock (`wait_lock` in the specification).
pub struct WaitState {
    delays: Vec<u64>,
    barrier: bool,
}

impl WaitState {
    pub fn new(max_threads: usize) -> Self {
        Self {
            delays: vec![0; max_threads],
            barrier: false,
        }
    }
}

/// What a dispatcher thread signals to the pool when it stops looping:
/// either it observed `BARRIER` (the pool should drain and restart), or
/// it hit end of input (the pool should terminate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOutcome {
    Barrier,
    Eoc,
}

/// Shared state for one team of dispatcher threads processing one
/// `.jobs` file. Lives for the duration of one pool run (`ems_exec::pool`
/// rebuilds the `wait_state` on every barrier restart, but keeps the
/// same reader/writer so the input cursor and output stream persist
/// across restarts).
pub struct StreamContext<'a, R, W> {
    pub reader: &'a Mutex<R>,
    pub writer: &'a OutputWriter<W>,
    pub wait_state: Mutex<WaitState>,
    pub max_threads: usize,
}

/// Runs one dispatcher thread's loop against `ctx` and `store` until it
/// observes a barrier or end of input.
pub fn run_thread<R, W>(
    ctx: &StreamContext<'_, R, W>,
    thread_id: usize,
    store: &EventStore,
) -> ThreadOutcome
where
    R: BufRead,
    W: std::io::Write,
{
    loop {
        if let Some(outcome) = check_barrier(ctx) {
            return outcome;
        }

        if let Some(delay_ms) = take_pending_delay(ctx, thread_id) {
            EventStore::wait(delay_ms);
        }

        let command = {
            let mut reader = ctx
                .reader
                .lock()
                .unwrap_or_else(|_| abort_on_poison("read lock"));
            next_command(&mut *reader)
        };

        let command = match command {
            Ok(command) => command,
            Err(err) => {
                tracing::error!(%err, "failed to read next command");
                return ThreadOutcome::Eoc;
            }
        };

        match dispatch(ctx, store, command) {
            Dispatch::Continue => {}
            Dispatch::Outcome(outcome) => return outcome,
        }
    }
}

enum Dispatch {
    Continue,
    Outcome(ThreadOutcome),
}

fn check_barrier<R, W>(ctx: &StreamContext<'_, R, W>) -> Option<ThreadOutcome> {
    let state = ctx
        .wait_state
        .lock()
        .unwrap_or_else(|_| abort_on_poison("wait lock"));
    if state.barrier {
        Some(ThreadOutcome::Barrier)
    } else {
        None
    }
}

fn take_pending_delay<R, W>(ctx: &StreamContext<'_, R, W>, thread_id: usize) -> Option<u64> {
    let mut state = ctx
        .wait_state
        .lock()
        .unwrap_or_else(|_| abort_on_poison("wait lock"));
    let slot = &mut state.delays[thread_id - 1];
    let pending = *slot;
    *slot = 0;
    if pending > 0 {
        Some(pending)
    } else {
        None
    }
}

fn dispatch<R, W>(ctx: &StreamContext<'_, R, W>, store: &EventStore, command: Command) -> Dispatch
where
    W: std::io::Write,
{
    match command {
        Command::Create {
            event_id,
            rows,
            cols,
        } => {
            if let Err(err) = store.create(event_id, rows, cols) {
                tracing::error!(%err, "CREATE failed");
            }
            Dispatch::Continue
        }
        Command::Reserve {
            event_id,
            mut xs,
            mut ys,
        } => {
            if let Err(err) = store.reserve(event_id, &mut xs, &mut ys) {
                tracing::error!(%err, "RESERVE failed");
            }
            Dispatch::Continue
        }
        Command::Show { event_id } => {
            if let Err(err) = store.show(event_id, ctx.writer) {
                tracing::error!(%err, "SHOW failed");
            }
            Dispatch::Continue
        }
        Command::List => {
            if let Err(err) = store.list_events(ctx.writer) {
                tracing::error!(%err, "LIST failed");
            }
            Dispatch::Continue
        }
        Command::Wait {
            delay_ms,
            thread_id,
        } => {
            apply_wait(ctx, delay_ms, thread_id);
            Dispatch::Continue
        }
        Command::Help => {
            println!("{}", usage_text());
            Dispatch::Continue
        }
        Command::Invalid => {
            tracing::error!("Invalid command. See HELP for usage");
            Dispatch::Continue
        }
        Command::Empty => Dispatch::Continue,
        Command::Barrier => {
            let mut state = ctx
                .wait_state
                .lock()
                .unwrap_or_else(|_| abort_on_poison("wait lock"));
            state.barrier = true;
            Dispatch::Outcome(ThreadOutcome::Barrier)
        }
        Command::Eoc => Dispatch::Outcome(ThreadOutcome::Eoc),
    }
}

fn apply_wait<R, W>(ctx: &StreamContext<'_, R, W>, delay_ms: u64, thread_id: Option<usize>) {
    match thread_id {
        Some(target) => {
            if target >= 1 && target <= ctx.max_threads && delay_ms > 0 {
                let mut state = ctx
                    .wait_state
                    .lock()
                    .unwrap_or_else(|_| abort_on_poison("wait lock"));
                state.delays[target - 1] = delay_ms;
            } else {
                tracing::error!(thread_id = target, "Invalid thread id");
            }
        }
        None => {
            if delay_ms > 0 {
                let mut state = ctx
                    .wait_state
                    .lock()
                    .unwrap_or_else(|_| abort_on_poison("wait lock"));
                for slot in state.delays.iter_mut() {
                    *slot = delay_ms;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ems_core::OutputWriter;
    use std::io::Cursor;

    fn ctx_for<'a>(
        reader: &'a Mutex<Cursor<Vec<u8>>>,
        writer: &'a OutputWriter<Vec<u8>>,
        max_threads: usize,
    ) -> StreamContext<'a, Cursor<Vec<u8>>, Vec<u8>> {
        StreamContext {
            reader,
            writer,
            wait_state: Mutex::new(WaitState::new(max_threads)),
            max_threads,
        }
    }

    #[test]
    fn single_thread_runs_to_eoc() {
        let reader = Mutex::new(Cursor::new(b"CREATE 1 1 1\nSHOW 1\n".to_vec()));
        let writer = OutputWriter::new(Vec::new());
        let ctx = ctx_for(&reader, &writer, 1);
        let store = EventStore::new(0);

        let outcome = run_thread(&ctx, 1, &store);
        assert_eq!(outcome, ThreadOutcome::Eoc);
        assert_eq!(&*writer.lock(), b"0\n");
    }

    #[test]
    fn barrier_stops_the_thread_and_sets_the_flag() {
        let reader = Mutex::new(Cursor::new(b"BARRIER\n".to_vec()));
        let writer = OutputWriter::new(Vec::new());
        let ctx = ctx_for(&reader, &writer, 1);
        let store = EventStore::new(0);

        let outcome = run_thread(&ctx, 1, &store);
        assert_eq!(outcome, ThreadOutcome::Barrier);
        assert!(ctx.wait_state.lock().unwrap().barrier);
    }

    #[test]
    fn targeted_wait_sets_only_that_threads_slot() {
        let reader = Mutex::new(Cursor::new(Vec::new()));
        let writer = OutputWriter::new(Vec::new());
        let ctx = ctx_for(&reader, &writer, 3);

        apply_wait(&ctx, 50, Some(2));
        let state = ctx.wait_state.lock().unwrap();
        assert_eq!(state.delays, vec![0, 50, 0]);
    }

    #[test]
    fn broadcast_wait_sets_every_slot() {
        let reader = Mutex::new(Cursor::new(Vec::new()));
        let writer = OutputWriter::new(Vec::new());
        let ctx = ctx_for(&reader, &writer, 3);

        apply_wait(&ctx, 50, None);
        let state = ctx.wait_state.lock().unwrap();
        assert_eq!(state.delays, vec![50, 50, 50]);
    }

    #[test]
    fn out_of_range_thread_id_is_rejected() {
        let reader = Mutex::new(Cursor::new(Vec::new()));
        let writer = OutputWriter::new(Vec::new());
        let ctx = ctx_for(&reader, &writer, 2);

        apply_wait(&ctx, 50, Some(7));
        let state = ctx.wait_state.lock().unwrap();
        assert_eq!(state.delays, vec![0, 0]);
    }
}
