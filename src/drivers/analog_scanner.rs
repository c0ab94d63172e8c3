//! Background round-robin ADC scan.
//!
//! Instead of starting a conversion and waiting for it, each tick harvests the
//! conversion started on the previous tick and then starts the next channel.
//! The conversion time overlaps the 1 ms tick, so a sample is between 1 and
//! (channel count) ticks old when the foreground reads it.

use crate::config::MAX_CHANNELS;
use crate::hal::AnalogSampler;

pub struct AnalogScanner<A> {
    adc: A,
    channels: u8,
    current: u8,
    pending: bool,
}

impl<A> AnalogScanner<A> {
    pub const fn new(adc: A) -> Self {
        Self {
            adc,
            channels: 0,
            current: 0,
            pending: false,
        }
    }
}

impl<A: AnalogSampler> AnalogScanner<A> {
    /// Scan channels `0..channels`, clamped to `MAX_CHANNELS`. Zero disables scanning.
    pub fn configure(&mut self, channels: u8) -> u8 {
        self.channels = channels.min(MAX_CHANNELS as u8);
        self.current = 0;
        self.pending = false;
        self.channels
    }

    /// One tick of the scan. Returns the harvested `(channel, value)`, if any.
    pub fn step(&mut self) -> Option<(u8, u16)> {
        if self.channels == 0 {
            return None;
        }

        let mut harvested = None;
        if self.pending {
            match self.adc.harvest() {
                Ok(value) => harvested = Some((self.current, value)),
                // Still converting: leave it running and look again next tick
                Err(nb::Error::WouldBlock) => return None,
                Err(nb::Error::Other(_)) => {}
            }
            self.current += 1;
            if self.current >= self.channels {
                self.current = 0;
            }
        }

        self.adc.start(self.current);
        self.pending = true;
        harvested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimAdc;

    #[test]
    fn disabled_scan_never_touches_adc() {
        let adc = SimAdc::new();
        let mut scanner = AnalogScanner::new(&adc);
        scanner.configure(0);

        assert_eq!(scanner.step(), None);
        assert_eq!(adc.conversions_started(), 0);
    }

    #[test]
    fn rotates_through_channels() {
        let adc = SimAdc::new();
        for ch in 0..3 {
            adc.set(ch, 100 + ch as u16);
        }
        let mut scanner = AnalogScanner::new(&adc);
        scanner.configure(3);

        // First tick only primes channel 0
        assert_eq!(scanner.step(), None);
        assert_eq!(scanner.step(), Some((0, 100)));
        assert_eq!(scanner.step(), Some((1, 101)));
        assert_eq!(scanner.step(), Some((2, 102)));
        assert_eq!(scanner.step(), Some((0, 100)));
    }

    #[test]
    fn channel_count_is_clamped() {
        let adc = SimAdc::new();
        let mut scanner = AnalogScanner::new(&adc);
        assert_eq!(scanner.configure(200), MAX_CHANNELS as u8);
    }

    #[test]
    fn busy_conversion_is_left_running() {
        let adc = SimAdc::new();
        adc.set(0, 7);
        adc.set(1, 8);
        let mut scanner = AnalogScanner::new(&adc);
        scanner.configure(2);

        scanner.step();
        adc.set_busy(true);
        assert_eq!(scanner.step(), None);
        assert_eq!(adc.conversions_started(), 1);

        adc.set_busy(false);
        assert_eq!(scanner.step(), Some((0, 7)));
        assert_eq!(scanner.step(), Some((1, 8)));
    }

    #[test]
    fn failed_conversion_is_skipped() {
        let adc = SimAdc::new();
        adc.set(1, 55);
        let mut scanner = AnalogScanner::new(&adc);
        scanner.configure(2);

        scanner.step();
        adc.fail_next();
        assert_eq!(scanner.step(), None);
        assert_eq!(scanner.step(), Some((1, 55)));
    }
}
