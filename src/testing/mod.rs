//! Host simulation doubles for the scheduler's hardware collaborators.
//!
//! Pair them with [`crate::os::SystemClock`]: call `clock.tick()` and then
//! `scheduler.on_tick()` to reproduce what the two timer interrupts do.

use crate::config::MAX_CHANNELS;
use crate::hal::{AnalogSampler, DigitalInputs};
use core::cell::Cell;

/// Digital inputs whose levels the test sets directly
pub struct SimPins {
    levels: Cell<u32>,
}

impl SimPins {
    pub const fn new() -> Self {
        Self { levels: Cell::new(0) }
    }

    pub fn set(&self, pin: u8, high: bool) {
        let mask = 1u32 << (pin & 31);
        let levels = self.levels.get();
        self.levels.set(if high { levels | mask } else { levels & !mask });
    }
}

impl Default for SimPins {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalInputs for SimPins {
    fn is_high(&self, pin: u8) -> bool {
        pin < 32 && self.levels.get() & (1 << pin) != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimAdcError;

/// ADC that returns the channel's current value when a conversion is harvested
pub struct SimAdc {
    values: [Cell<u16>; MAX_CHANNELS],
    selected: Cell<Option<u8>>,
    started: Cell<u32>,
    busy: Cell<bool>,
    fail: Cell<bool>,
}

impl SimAdc {
    pub const fn new() -> Self {
        Self {
            values: [const { Cell::new(0) }; MAX_CHANNELS],
            selected: Cell::new(None),
            started: Cell::new(0),
            busy: Cell::new(false),
            fail: Cell::new(false),
        }
    }

    pub fn set(&self, channel: u8, value: u16) {
        if let Some(cell) = self.values.get(channel as usize) {
            cell.set(value);
        }
    }

    /// Hold every harvest in `WouldBlock`
    pub fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }

    /// Make the next harvest report a conversion error
    pub fn fail_next(&self) {
        self.fail.set(true);
    }

    pub fn conversions_started(&self) -> u32 {
        self.started.get()
    }
}

impl Default for SimAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogSampler for SimAdc {
    type Error = SimAdcError;

    fn start(&self, channel: u8) {
        self.selected.set(Some(channel));
        self.started.set(self.started.get() + 1);
    }

    fn harvest(&self) -> nb::Result<u16, Self::Error> {
        if self.busy.get() {
            return Err(nb::Error::WouldBlock);
        }
        if self.fail.replace(false) {
            return Err(nb::Error::Other(SimAdcError));
        }
        self.selected
            .get()
            .and_then(|channel| self.values.get(channel as usize))
            .map(Cell::get)
            .ok_or(nb::Error::Other(SimAdcError))
    }
}
