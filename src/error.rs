//! Scheduler error types

use core::fmt;

/// Result type for schedule table operations
pub type Result<T> = core::result::Result<T, ScheduleError>;

/// Registration failures. Queries never fail, they report "no event" instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// Every slot is taken and the id is not already registered
    TableFull,
    /// The id was never armed
    UnknownId,
}

impl ScheduleError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScheduleError::TableFull => "schedule table full",
            ScheduleError::UnknownId => "unknown schedule id",
        }
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ufmt::uDisplay for ScheduleError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(self.as_str())
    }
}
