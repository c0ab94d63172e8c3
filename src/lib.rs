//! Millisecond event scheduler for the ATmega128.
//!
//! A foreground loop registers timers and debounced pin watches; a 1 kHz
//! timer interrupt keeps them up to date in the background together with a
//! round-robin analog scan, so the loop never blocks on a conversion or a
//! delay. See [`rtos::Scheduler`] for the public operations.
#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod config;
pub mod drivers;
pub mod error;
pub mod hal;
pub mod logging;
pub mod os;
pub mod rtos;
pub mod testing;

pub use drivers::{Edge, Thresholds};
pub use error::{Result, ScheduleError};
pub use rtos::{Scheduler, SlotId};
