//! Integrator debounce with Schmitt-trigger hysteresis.
//!
//! Each evaluation nudges an accumulator toward the instantaneous pin level,
//! acting as a low-pass filter. The confirmed level only flips once the
//! accumulator crosses the upper or lower threshold, so a contact has to
//! stay put for several ticks before an edge is reported.

use crate::config::{
    DEBOUNCE_THRESH_BOTTOM, DEBOUNCE_THRESH_DOWN, DEBOUNCE_THRESH_MAX, DEBOUNCE_THRESH_UP,
};

/// Direction of a confirmed level transition
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// Accumulator limits. Both edges are only reachable with
/// `min < lower <= upper < max`; see [`Thresholds::is_valid`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    pub upper: u8,
    pub lower: u8,
    pub max: u8,
    pub min: u8,
}

impl Thresholds {
    pub const DEFAULT: Self = Self {
        upper: DEBOUNCE_THRESH_UP,
        lower: DEBOUNCE_THRESH_DOWN,
        max: DEBOUNCE_THRESH_MAX,
        min: DEBOUNCE_THRESH_BOTTOM,
    };

    /// Rising needs the accumulator above `upper` and falling needs it below
    /// `lower`, so both must sit strictly inside the rails.
    pub const fn is_valid(&self) -> bool {
        self.min < self.lower && self.lower <= self.upper && self.upper < self.max
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-pin debounce state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Debouncer {
    accumulator: u8,
    level: bool,
    changed: bool,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            accumulator: 0,
            level: false,
            changed: false,
        }
    }

    /// Force the filter onto the rail matching `high` without reporting an edge
    pub fn snapshot(&mut self, high: bool, thresholds: &Thresholds) {
        self.accumulator = if high { thresholds.max } else { thresholds.min };
        self.level = high;
        self.changed = false;
    }

    /// Feed one instantaneous read. With `smoothing` off the accumulator snaps
    /// straight to the rail, so the level follows the input on every call.
    pub fn sample(&mut self, high: bool, smoothing: bool, thresholds: &Thresholds) -> Option<Edge> {
        if high {
            self.accumulator = if smoothing {
                self.accumulator.saturating_add(1).min(thresholds.max)
            } else {
                thresholds.max
            };

            if self.accumulator > thresholds.upper {
                self.accumulator = thresholds.max;
                if !self.level {
                    self.level = true;
                    self.changed = true;
                    return Some(Edge::Rising);
                }
            }
        } else {
            self.accumulator = if smoothing {
                self.accumulator.saturating_sub(1).max(thresholds.min)
            } else {
                thresholds.min
            };

            if self.accumulator < thresholds.lower {
                self.accumulator = thresholds.min;
                if self.level {
                    self.level = false;
                    self.changed = true;
                    return Some(Edge::Falling);
                }
            }
        }
        None
    }

    /// Confirmed level
    #[inline]
    pub fn level(&self) -> bool {
        self.level
    }

    /// Read and clear the changed flag
    #[inline]
    pub fn take_change(&mut self) -> bool {
        core::mem::replace(&mut self.changed, false)
    }

    #[inline]
    pub fn accumulator(&self) -> u8 {
        self.accumulator
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
