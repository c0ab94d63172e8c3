//! System time tracking for the scheduler

use crate::config::TICK_MS;
use crate::hal::TickSource;
use core::cell::Cell;
use critical_section::Mutex;

/// Millisecond counter advanced by the clock interrupt.
///
/// On the ATmega128 the `TIMER1_COMPA` handler calls [`SystemClock::tick`];
/// host tests call it directly to simulate time.
pub struct SystemClock {
    millis: Mutex<Cell<u32>>,
}

impl SystemClock {
    /// Create new clock starting at zero
    pub const fn new() -> Self {
        Self {
            millis: Mutex::new(Cell::new(0)),
        }
    }

    /// Increment system tick counter
    #[inline]
    pub fn tick(&self) {
        self.advance(TICK_MS);
    }

    /// Jump the counter forward
    pub fn advance(&self, ms: u32) {
        critical_section::with(|cs| {
            let millis = self.millis.borrow(cs);
            millis.set(millis.get().wrapping_add(ms));
        });
    }

    /// Current millisecond count; four bytes on AVR, so read under a critical section
    #[inline]
    pub fn millis(&self) -> u32 {
        critical_section::with(|cs| self.millis.borrow(cs).get())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SystemClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        self.millis()
    }
}
