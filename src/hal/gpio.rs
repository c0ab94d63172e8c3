use super::DigitalInputs;
use avr_device::atmega128a::{PORTB, PORTD};

/// Digital inputs numbered the way the scheduler addresses them:
/// pins 0-7 are PORTD0-7, pins 8-15 are PORTB0-7.
#[derive(Clone, Copy, Default)]
pub struct BoardInputs;

macro_rules! configure_bit {
    ($PORT:ident, $ddr:ident, $port:ident, $bit:expr, $pull_up:expr) => {
        unsafe {
            let p = $PORT::ptr();
            (*p).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << $bit)));
            (*p).$port.modify(|r, w| {
                if $pull_up {
                    w.bits(r.bits() | (1 << $bit))
                } else {
                    w.bits(r.bits() & !(1 << $bit))
                }
            });
        }
    };
}

impl BoardInputs {
    pub const fn new() -> Self {
        Self
    }

    /// Make `pin` an input, optionally with the internal pull-up
    pub fn configure_input(&self, pin: u8, pull_up: bool) {
        avr_device::interrupt::free(|_| match pin {
            0..=7 => configure_bit!(PORTD, ddrd, portd, pin, pull_up),
            8..=15 => configure_bit!(PORTB, ddrb, portb, pin - 8, pull_up),
            _ => {}
        });
    }
}

impl DigitalInputs for BoardInputs {
    #[inline]
    fn is_high(&self, pin: u8) -> bool {
        unsafe {
            match pin {
                0..=7 => (*PORTD::ptr()).pind.read().bits() & (1 << pin) != 0,
                8..=15 => (*PORTB::ptr()).pinb.read().bits() & (1 << (pin - 8)) != 0,
                _ => false,
            }
        }
    }
}
