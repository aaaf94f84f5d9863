//! Error taxonomy for the event management service.
//!
//! Mirrors the failure kinds a command may report: usage errors abort the
//! supervisor before any work starts, I/O errors propagate to the caller,
//! command errors are reported on stderr and never terminate a thread, and
//! a poisoned lock is treated as fatal (see [`crate::logging::abort_on_poison`]).

use thiserror::Error;

/// Top-level error type shared across the workspace's library crates.
#[derive(Debug, Error)]
pub enum EmsError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("fatal lock error: shared state may be corrupt")]
    Lock,
}

/// A command-level failure: invalid syntax, an out-of-range seat, an
/// unknown event, and so on. These never terminate the dispatcher thread
/// that raised them; the caller reports the message and moves to the next
/// command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid command. See HELP for usage")]
    InvalidSyntax,

    #[error("Invalid reservation")]
    InvalidReservation,

    #[error("Invalid seat")]
    InvalidSeat,

    #[error("Invalid thread id")]
    InvalidThreadId,

    #[error("EMS state must be initialized")]
    NotInitialized,

    #[error("Event already exists")]
    EventAlreadyExists,

    #[error("Event not found")]
    EventNotFound,

    #[error("Seat already reserved")]
    SeatAlreadyReserved,
}

pub type EmsResult<T> = Result<T, EmsError>;
