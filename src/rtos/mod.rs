//! Millisecond event scheduler: schedule table, slots and the tick entry point
pub mod scheduler;
pub mod slot;
pub mod table;

pub use scheduler::Scheduler;
pub use slot::{watches_pin, Sampling, Slot, SlotId};
pub use table::ScheduleTable;
