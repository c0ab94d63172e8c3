pub mod analog_scanner;
pub mod debounce;
pub mod edge_counter;
#[cfg(target_arch = "avr")]
pub mod serial_console;

pub use analog_scanner::AnalogScanner;
pub use debounce::{Debouncer, Edge, Thresholds};
pub use edge_counter::EdgeCounter;
#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
