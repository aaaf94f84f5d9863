//! Event/seat data model and the reserve/show/list operations of the
//! event management service, including the two-level lock hierarchy
//! (event list -> per-event -> per-seat) that makes multi-seat
//! reservation deadlock-free.

pub mod event;
pub mod seat;
pub mod sort;
pub mod store;
pub mod writer;

pub use event::Event;
pub use seat::Seat;
pub use store::EventStore;
pub use writer::OutputWriter;
