//! Confirmed-edge counters shared between the tick interrupt and the foreground.
//!
//! The interrupt is the only context that increments; the foreground reads and
//! resets. Only atomic load/store is used since AVR has no compare-and-swap;
//! the reset write is the one step that masks the tick.

use super::debounce::Edge;
use core::sync::atomic::{AtomicU16, Ordering};

pub struct EdgeCounter {
    rising: AtomicU16,
    falling: AtomicU16,
}

impl EdgeCounter {
    pub const fn new() -> Self {
        Self {
            rising: AtomicU16::new(0),
            falling: AtomicU16::new(0),
        }
    }

    fn cell(&self, edge: Edge) -> &AtomicU16 {
        match edge {
            Edge::Rising => &self.rising,
            Edge::Falling => &self.falling,
        }
    }

    /// Count one edge. Tick interrupt or critical section only.
    #[inline]
    pub fn record(&self, edge: Edge) {
        let cell = self.cell(edge);
        cell.store(cell.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
    }

    /// Count since the last reset
    pub fn read(&self, edge: Edge) -> u16 {
        stable_load(self.cell(edge))
    }

    /// Count since the last reset, then reset
    pub fn take(&self, edge: Edge) -> u16 {
        self.take_with(edge, || {})
    }

    /// `window` runs between the stable read and the reset write, which is
    /// exactly where a tick can land.
    fn take_with(&self, edge: Edge, window: impl FnOnce()) -> u16 {
        let cell = self.cell(edge);
        let held = stable_load(cell);
        window();
        // Edges counted after `held` carry over to the next read. The
        // read-modify-write itself must not be split by a tick.
        critical_section::with(|_| {
            let missed = cell.load(Ordering::Relaxed).wrapping_sub(held);
            cell.store(missed, Ordering::Relaxed);
        });
        held
    }

    pub fn clear(&self) {
        self.rising.store(0, Ordering::Relaxed);
        self.falling.store(0, Ordering::Relaxed);
    }
}

impl Default for EdgeCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-read until two consecutive loads agree. A tick fires once per ms and
/// this loop is much faster, so it runs at most twice in practice.
fn stable_load(cell: &AtomicU16) -> u16 {
    loop {
        let first = cell.load(Ordering::Acquire);
        if cell.load(Ordering::Acquire) == first {
            return first;
        }
    }
}
