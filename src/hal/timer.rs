//! Timer1 as the scheduler's time base.
//!
//! CTC mode at 1 kHz (16MHz / 64 / 250). `TIMER1_COMPA` fires as the counter
//! wraps and advances the millisecond clock; `TIMER1_COMPB` fires
//! `TICK_PHASE_OFFSET` counts later, by which point the clock is already
//! updated and stable, and drives `Scheduler::on_tick`.

use crate::config::{TICK_COMPARE, TICK_PHASE_OFFSET};
use avr_device::atmega128a::TC1;

const WGM12: u8 = 1 << 3;
const CS_DIV64: u8 = 0x03;
const OCIE1A: u8 = 1 << 4;
const OCIE1B: u8 = 1 << 3;

pub struct TickTimer {
    _private: (),
}

impl TickTimer {
    pub fn new() -> Self {
        avr_device::interrupt::free(|_| unsafe {
            let p = TC1::ptr();
            // Stopped and masked while reconfiguring
            (*p).timsk.modify(|r, w| w.bits(r.bits() & !(OCIE1A | OCIE1B)));
            (*p).tccr1b.write(|w| w.bits(0));
            (*p).tccr1a.write(|w| w.bits(0));
            (*p).tcnt1.write(|w| w.bits(0));

            (*p).ocr1a.write(|w| w.bits(TICK_COMPARE));
            (*p).ocr1b.write(|w| w.bits(TICK_PHASE_OFFSET));
        });
        Self { _private: () }
    }

    /// Start counting and unmask both compare interrupts
    pub fn start(&mut self) {
        avr_device::interrupt::free(|_| unsafe {
            let p = TC1::ptr();
            (*p).tccr1b.write(|w| w.bits(WGM12 | CS_DIV64));
            (*p).timsk.modify(|r, w| w.bits(r.bits() | OCIE1A | OCIE1B));
        });
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}
