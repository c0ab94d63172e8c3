//! Hardware collaborators the scheduler core needs from its environment.
//!
//! The core only reads time, reads pins and drives a single-channel ADC.
//! Installing the tick interrupt is platform glue (see `timer` on AVR).

use core::convert::Infallible;
use embedded_hal::digital::v2::InputPin;

#[cfg(target_arch = "avr")]
pub mod adc;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(target_arch = "avr")]
pub use adc::Adc;
#[cfg(target_arch = "avr")]
pub use gpio::BoardInputs;
#[cfg(target_arch = "avr")]
pub use timer::TickTimer;
#[cfg(target_arch = "avr")]
pub use uart::Uart;

/// Monotonically increasing millisecond counter
pub trait TickSource {
    fn now_ms(&self) -> u32;
}

/// Instantaneous logic level of a digital input, addressed by pin number
pub trait DigitalInputs {
    fn is_high(&self, pin: u8) -> bool;
}

/// Single-channel analog converter split into start and harvest halves
pub trait AnalogSampler {
    type Error;

    /// Begin a conversion on `channel`; must not wait for it to finish
    fn start(&self, channel: u8);

    /// Result of the last started conversion, `WouldBlock` while it is running
    fn harvest(&self) -> nb::Result<u16, Self::Error>;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    #[inline]
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

impl<T: DigitalInputs + ?Sized> DigitalInputs for &T {
    #[inline]
    fn is_high(&self, pin: u8) -> bool {
        (**self).is_high(pin)
    }
}

impl<T: AnalogSampler + ?Sized> AnalogSampler for &T {
    type Error = T::Error;

    #[inline]
    fn start(&self, channel: u8) {
        (**self).start(channel)
    }

    #[inline]
    fn harvest(&self) -> nb::Result<u16, Self::Error> {
        (**self).harvest()
    }
}

/// A bank of `embedded-hal` input pins indexed by position.
/// Pins past the end and pins that fail to read report LOW.
impl<P: InputPin, const N: usize> DigitalInputs for [P; N] {
    fn is_high(&self, pin: u8) -> bool {
        self.get(pin as usize)
            .and_then(|p| p.is_high().ok())
            .unwrap_or(false)
    }
}

/// Sampler for boards that do not scan analog channels
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnalog;

impl AnalogSampler for NoAnalog {
    type Error = Infallible;

    fn start(&self, _channel: u8) {}

    fn harvest(&self) -> nb::Result<u16, Self::Error> {
        Err(nb::Error::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin;

    #[test]
    fn pin_bank_reads_by_position() {
        let expectations = [
            pin::Transaction::get(pin::State::High),
            pin::Transaction::get(pin::State::Low),
        ];
        let mut first = pin::Mock::new(&expectations);
        let mut second = pin::Mock::new(&[pin::Transaction::get(pin::State::High)]);

        let bank = [first.clone(), second.clone()];

        assert!(bank.is_high(0));
        assert!(!bank.is_high(0));
        assert!(bank.is_high(1));
        // Out of range never touches a pin
        assert!(!bank.is_high(7));

        first.done();
        second.done();
    }

    #[test]
    fn no_analog_never_completes() {
        let adc = NoAnalog;
        adc.start(3);
        assert!(matches!(adc.harvest(), Err(nb::Error::WouldBlock)));
    }
}
