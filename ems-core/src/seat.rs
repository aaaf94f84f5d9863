//! A single seat within an event.

use std::sync::Mutex;
use std::sync::MutexGuard;

use ems_common::logging::abort_on_poison;

/// A seat's reservation id: 0 means unreserved, any positive value is the
/// id minted by the reservation that claimed it. Once positive, a seat's
/// id never changes again.
pub struct Seat {
    reservation_id: Mutex<u64>,
}

impl Seat {
    pub fn new() -> Self {
        Self {
            reservation_id: Mutex::new(0),
        }
    }

    /// Locks the seat and returns its current reservation id.
    pub fn reservation_id(&self) -> u64 {
        *self
            .reservation_id
            .lock()
            .unwrap_or_else(|_| abort_on_poison("seat lock"))
    }

    /// Locks the seat for the duration of `f`, handing the mutable
    /// reservation id to the closure.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut u64) -> R) -> R {
        let mut guard = self
            .reservation_id
            .lock()
            .unwrap_or_else(|_| abort_on_poison("seat lock"));
        f(&mut guard)
    }

    /// Locks the seat and returns the guard directly, so a caller can
    /// hold several seat locks open at once (the multi-seat `reserve`
    /// walk) rather than being confined to one closure's scope.
    pub fn lock(&self) -> MutexGuard<'_, u64> {
        self.reservation_id
            .lock()
            .unwrap_or_else(|_| abort_on_poison("seat lock"))
    }
}

impl Default for Seat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unreserved() {
        let seat = Seat::new();
        assert_eq!(seat.reservation_id(), 0);
    }

    #[test]
    fn with_locked_mutates_id() {
        let seat = Seat::new();
        seat.with_locked(|id| *id = 7);
        assert_eq!(seat.reservation_id(), 7);
    }
}
