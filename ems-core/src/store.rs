//! The event store: owns the event list and enforces the lock hierarchy
//! `list_lock -> event_lock -> seat_lock[i] (i ascending)` during
//! multi-seat reservation.

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use ems_common::error::CommandError;
use ems_common::error::EmsError;
use ems_common::logging::abort_on_poison;

use crate::event::Event;
use crate::sort::colex_sort;
use crate::writer::write_all_buffered;
use crate::writer::OutputWriter;

/// Owns the event list for one worker process and the simulated
/// state-access delay applied before every lookup.
pub struct EventStore {
    events: Mutex<Vec<Arc<Event>>>,
    state_access_delay_ms: u64,
    terminated: Mutex<bool>,
}

impl EventStore {
    pub fn new(state_access_delay_ms: u64) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            state_access_delay_ms,
            terminated: Mutex::new(false),
        }
    }

    fn simulate_delay(&self) {
        if self.state_access_delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.state_access_delay_ms));
        }
    }

    /// Fails with `NotInitialized` once `terminate` has been called; every
    /// public operation but `terminate` itself checks this first.
    fn ensure_initialized(&self) -> Result<(), EmsError> {
        let terminated = self
            .terminated
            .lock()
            .unwrap_or_else(|_| abort_on_poison("terminate lock"));
        if *terminated {
            return Err(CommandError::NotInitialized.into());
        }
        Ok(())
    }

    /// Releases the event list, matching spec.md §4.B's `terminate()`.
    /// Fails if already terminated (the Rust analogue of "not
    /// initialized", since this store is always initialized on
    /// construction — see `DESIGN.md`).
    pub fn terminate(&self) -> Result<(), EmsError> {
        let mut terminated = self
            .terminated
            .lock()
            .unwrap_or_else(|_| abort_on_poison("terminate lock"));
        if *terminated {
            return Err(CommandError::NotInitialized.into());
        }

        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|_| abort_on_poison("list lock"));
        events.clear();
        *terminated = true;
        Ok(())
    }

    /// Looks up an event by id, simulating the costly-memory-access
    /// delay on every call as the original implementation does -
    /// including the internal lookups `reserve`/`show` perform after
    /// releasing `list_lock`.
    fn find(&self, event_id: u32) -> Option<Arc<Event>> {
        let events = self
            .events
            .lock()
            .unwrap_or_else(|_| abort_on_poison("list lock"));
        self.simulate_delay();
        events.iter().find(|e| e.id == event_id).cloned()
    }

    /// Creates a new event. Fails if an event with `event_id` already
    /// exists or the requested grid has no rows/columns.
    pub fn create(&self, event_id: u32, rows: usize, cols: usize) -> Result<(), EmsError> {
        self.ensure_initialized()?;

        if rows == 0 || cols == 0 {
            return Err(EmsError::Resource(
                "event must have at least one row and column".to_string(),
            ));
        }

        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|_| abort_on_poison("list lock"));

        self.simulate_delay();
        if events.iter().any(|e| e.id == event_id) {
            return Err(CommandError::EventAlreadyExists.into());
        }

        events.push(Arc::new(Event::new(event_id, rows, cols)));
        Ok(())
    }

    /// Reserves every `(xs[i], ys[i])` seat of `event_id` atomically,
    /// minting one new reservation id shared by all of them. Either every
    /// requested seat ends up with that id, or the call fails and no seat
    /// changes.
    pub fn reserve(&self, event_id: u32, xs: &mut [usize], ys: &mut [usize]) -> Result<(), EmsError> {
        self.ensure_initialized()?;

        if xs.is_empty() {
            return Err(CommandError::InvalidReservation.into());
        }

        let event = self.find(event_id).ok_or(CommandError::EventNotFound)?;

        colex_sort(xs, ys).map_err(|_| CommandError::InvalidReservation)?;

        // Lock seats in ascending sorted order; this is the deadlock-
        // freedom argument for concurrent `reserve` calls. Stop and
        // release everything already held on the first invalid seat or
        // conflict.
        let mut held = Vec::with_capacity(xs.len());
        for i in 0..xs.len() {
            let (row, col) = (xs[i], ys[i]);
            if !event.in_bounds(row, col) {
                drop(held);
                return Err(CommandError::InvalidSeat.into());
            }

            self.simulate_delay();
            let seat = event.seat(event.seat_index(row, col));
            let guard = seat.lock();
            if *guard != 0 {
                drop(guard);
                drop(held);
                return Err(CommandError::SeatAlreadyReserved.into());
            }
            held.push(guard);
        }

        let reservation_id = event.next_reservation_id();
        for mut guard in held {
            *guard = reservation_id;
        }
        Ok(())
    }

    /// Renders `event_id`'s grid to `writer`: `rows` lines of `cols`
    /// space-separated reservation ids, holding the writer lock for the
    /// whole render so no other thread's output can interleave inside it.
    pub fn show<W: Write>(&self, event_id: u32, writer: &OutputWriter<W>) -> Result<(), EmsError> {
        self.ensure_initialized()?;

        let event = self.find(event_id).ok_or(CommandError::EventNotFound)?;

        let mut out = writer.lock();
        for row in 1..=event.rows {
            for col in 1..=event.cols {
                self.simulate_delay();
                let id = event.seat(event.seat_index(row, col)).reservation_id();
                write_all_buffered(&mut *out, id.to_string().as_bytes())?;
                if col < event.cols {
                    write_all_buffered(&mut *out, b" ")?;
                }
            }
            write_all_buffered(&mut *out, b"\n")?;
        }
        Ok(())
    }

    /// Writes one `Event: <id>` line per event in insertion order, or
    /// `No events` if the store is empty. `list_lock` is held for the
    /// whole render.
    pub fn list_events<W: Write>(&self, writer: &OutputWriter<W>) -> Result<(), EmsError> {
        self.ensure_initialized()?;

        let events = self
            .events
            .lock()
            .unwrap_or_else(|_| abort_on_poison("list lock"));

        let mut out = writer.lock();
        if events.is_empty() {
            write_all_buffered(&mut *out, b"No events\n")?;
            return Ok(());
        }

        for event in events.iter() {
            write_all_buffered(&mut *out, b"Event: ")?;
            write_all_buffered(&mut *out, event.id.to_string().as_bytes())?;
            write_all_buffered(&mut *out, b"\n")?;
        }
        Ok(())
    }

    /// Sleeps for `delay_ms`, used for both programmatic `WAIT` pauses
    /// and the simulated state-access delay.
    pub fn wait(delay_ms: u64) {
        if delay_ms > 0 {
            thread::sleep(Duration::from_millis(delay_ms));
        }
    }
}
