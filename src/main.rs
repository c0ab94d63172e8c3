#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use atmega128_scheduler::application::{wait_for, PulseDialDecoder};
    use atmega128_scheduler::drivers::SerialConsole;
    use atmega128_scheduler::hal::adc::AdcPrescaler;
    use atmega128_scheduler::hal::{Adc, BoardInputs, TickTimer};
    use atmega128_scheduler::os::SystemClock;
    use atmega128_scheduler::{Scheduler, SlotId};
    use ufmt::uwriteln;

    const DIAL_PIN: SlotId = 2;
    const GAP_TIMER: SlotId = 64;
    const STARTUP_TIMER: SlotId = 65;
    const LIGHT_SENSOR: u8 = 0;
    const ANALOG_CHANNELS: u8 = 2;

    static CLOCK: SystemClock = SystemClock::new();
    static SCHEDULER: Scheduler<&'static SystemClock, BoardInputs, Adc> =
        Scheduler::new(&CLOCK, BoardInputs::new(), Adc::new());

    #[avr_device::interrupt(atmega128a)]
    fn TIMER1_COMPA() {
        CLOCK.tick();
    }

    #[avr_device::interrupt(atmega128a)]
    fn TIMER1_COMPB() {
        // Let the clock interrupt preempt a long scheduler pass
        unsafe { avr_device::interrupt::enable() };
        SCHEDULER.on_tick();
    }

    #[avr_device::entry]
    fn main() -> ! {
        let mut console = SerialConsole::new();

        BoardInputs::new().configure_input(DIAL_PIN as u8, true);
        Adc::new().enable(AdcPrescaler::Div128);

        SCHEDULER.init(ANALOG_CHANNELS);
        let mut timer = TickTimer::new();
        timer.start();
        unsafe { avr_device::interrupt::enable() };

        console.write_line("ATmega128 scheduler v0.1.0");

        // Give the pull-up and the first analog scan time to settle
        if SCHEDULER.arm(STARTUP_TIMER, false, 100).is_ok() {
            wait_for(&SCHEDULER, STARTUP_TIMER);
        }
        let _ = SCHEDULER.cancel(STARTUP_TIMER);

        let mut decoder = PulseDialDecoder::new(DIAL_PIN, GAP_TIMER);
        if let Err(e) = decoder.start(&SCHEDULER) {
            let _ = uwriteln!(console, "dial: {}", e);
        }
        console.write_line("Ready...");

        loop {
            match decoder.update(&SCHEDULER) {
                Ok(Some(digit)) => {
                    let light = SCHEDULER.analog_read(LIGHT_SENSOR);
                    let _ = uwriteln!(console, "digit {} (light {})", digit, light);
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = uwriteln!(console, "dial: {}", e);
                }
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    println!("atmega128_scheduler: firmware image only, build for avr-atmega128");
}
