use crate::config::MAX_PIN;
use crate::drivers::Debouncer;

/// Slot identifier. `0..=MAX_PIN` watches that digital pin, anything else is a manual timer.
pub type SlotId = i8;

/// How the debounce filter treats this expiry's pin read
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sampling {
    /// Integrate toward the read level
    Smoothed,
    /// Recurring zero-period watch: snap straight to the read level
    Immediate,
}

impl Sampling {
    #[inline]
    pub fn smoothing(self) -> bool {
        self == Sampling::Smoothed
    }
}

#[inline]
pub fn watches_pin(id: SlotId) -> bool {
    (0..=MAX_PIN).contains(&id)
}

/// Milliseconds from `since` to `now` over the free-running counter.
/// Exact across a wrap, so any `u32` period can be measured.
#[inline]
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[derive(Copy, Clone, Debug)]
pub struct Slot {
    pub id: SlotId,
    pub active: bool,
    pub recurring: bool,
    pub period_ms: u32,
    /// Start of the current period; the slot is due `period_ms` later
    pub started: u32,
    /// Expiries the tick consumed on the foreground's behalf, not yet polled
    pub pending: u16,
    pub debounce: Debouncer,
}

impl Slot {
    pub const fn new(id: SlotId) -> Self {
        Self {
            id,
            active: false,
            recurring: false,
            period_ms: 0,
            started: 0,
            pending: 0,
            debounce: Debouncer::new(),
        }
    }

    /// Pin number when this slot watches a digital input
    #[inline]
    pub fn pin(&self) -> Option<u8> {
        watches_pin(self.id).then_some(self.id as u8)
    }

    pub fn rearm(&mut self, recurring: bool, period_ms: u32, now: u32) {
        self.period_ms = period_ms;
        self.recurring = recurring;
        self.pending = 0;
        // A one-shot of zero length is the cancel idiom
        self.active = recurring || period_ms != 0;
        // A zero-period watch is due straight away, then once per tick
        self.started = if recurring && period_ms == 0 {
            now.wrapping_sub(1)
        } else {
            now
        };
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.pending = 0;
    }

    /// Consume one expiry if the slot is due.
    ///
    /// Recurring slots move on by one period from the previous start, so a
    /// late caller catches up one expiry per call without drifting.
    pub fn expire(&mut self, now: u32) -> Option<Sampling> {
        if !self.active {
            return None;
        }

        if self.recurring && self.period_ms == 0 {
            if elapsed(now, self.started) == 0 {
                return None;
            }
            self.started = now;
            return Some(Sampling::Immediate);
        }

        if elapsed(now, self.started) < self.period_ms {
            return None;
        }
        if self.recurring {
            self.started = self.started.wrapping_add(self.period_ms);
        } else {
            self.active = false;
        }
        Some(Sampling::Smoothed)
    }

    /// Hand one tick-consumed expiry to the foreground
    pub fn take_pending(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }
}
