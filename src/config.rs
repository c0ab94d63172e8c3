//! Configuration constants for the ATmega128 scheduler

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Scheduler tick period in milliseconds
pub const TICK_MS: u32 = 1;

/// Number of slots in the schedule table
pub const MAX_SLOTS: usize = 10;

/// Highest slot id treated as a debounced digital input.
/// Ids `0..=MAX_PIN` watch a pin, every other id is a manual timer.
pub const MAX_PIN: i8 = 15;

/// Number of analog channels the round-robin sampler can scan (ADC0..ADC7)
pub const MAX_CHANNELS: usize = 8;

/// Debounce integrator thresholds, evaluated once per tick
pub const DEBOUNCE_THRESH_UP: u8 = 15;
pub const DEBOUNCE_THRESH_DOWN: u8 = 5;
pub const DEBOUNCE_THRESH_MAX: u8 = 20;
pub const DEBOUNCE_THRESH_BOTTOM: u8 = 0;

/// Timer1 prescaler and compare value for a 1 kHz tick (16MHz / 64 / 250)
pub const TICK_PRESCALER: u16 = 64;
pub const TICK_COMPARE: u16 = (CPU_FREQ_HZ / TICK_PRESCALER as u32 / 1000) as u16 - 1;

/// Timer counts between the clock interrupt and the scheduler interrupt (~16us)
pub const TICK_PHASE_OFFSET: u16 = 4;

/// Silence after the last dial pulse that ends a digit
pub const INTERDIGIT_GAP_MS: u32 = 300;
