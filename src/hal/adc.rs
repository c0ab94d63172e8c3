use super::AnalogSampler;
use avr_device::atmega128a::ADC;
use core::convert::Infallible;

const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
// AVCC reference, right-adjusted result
const REFS_AVCC: u8 = 0x40;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcPrescaler {
    Div2 = 0,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
}

/// Non-blocking ADC driven by the scheduler's analog scan.
pub struct Adc {
    _private: (),
}

impl Adc {
    /// No register access; call [`Adc::enable`] during bring-up
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Enable the ADC. Div128 gives 125kHz at 16MHz, ~104us per conversion.
    pub fn enable(&self, prescaler: AdcPrescaler) {
        unsafe {
            let p = ADC::ptr();
            (*p).admux.write(|w| w.bits(REFS_AVCC));
            (*p).adcsra.write(|w| w.bits(ADEN | prescaler as u8));
        }
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogSampler for Adc {
    type Error = Infallible;

    fn start(&self, channel: u8) {
        unsafe {
            let p = ADC::ptr();
            (*p).admux.write(|w| w.bits(REFS_AVCC | (channel & 0x07)));
            (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
        }
    }

    fn harvest(&self) -> nb::Result<u16, Self::Error> {
        unsafe {
            let p = ADC::ptr();
            // ADSC stays set until the conversion completes
            if (*p).adcsra.read().bits() & ADSC != 0 {
                return Err(nb::Error::WouldBlock);
            }
            // 16-bit access reads ADCL before ADCH
            Ok((*p).adc.read().bits())
        }
    }
}
