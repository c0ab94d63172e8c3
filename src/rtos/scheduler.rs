//! Interrupt-driven millisecond event scheduler
//!
//! The foreground loop registers timers and pin watches with [`Scheduler::arm`]
//! and polls them at its own pace. A timer interrupt calls
//! [`Scheduler::on_tick`] once per millisecond to run the analog scan and
//! debounce every watched pin, whether or not the foreground polls it.
//!
//! Slot registration and debounce state sit behind a critical-section mutex,
//! taken only for the few instructions that touch one slot. Edge counters and
//! analog samples are atomics the foreground reads without masking interrupts.

use super::slot::{watches_pin, SlotId};
use super::table::ScheduleTable;
use crate::config::{MAX_CHANNELS, MAX_SLOTS};
use crate::drivers::{AnalogScanner, Edge, EdgeCounter, Thresholds};
use crate::error::Result;
use crate::hal::{AnalogSampler, DigitalInputs, TickSource};
use crate::{log_debug, log_info, log_warn};
use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};
use critical_section::Mutex;

pub struct Scheduler<C, D, A, const N: usize = MAX_SLOTS> {
    clock: C,
    inputs: D,
    thresholds: Thresholds,
    table: Mutex<RefCell<ScheduleTable<N>>>,
    counters: [EdgeCounter; N],
    scanner: Mutex<RefCell<AnalogScanner<A>>>,
    samples: [AtomicU16; MAX_CHANNELS],
    scan_channels: AtomicU8,
    initialized: AtomicBool,
}

impl<C, D, A, const N: usize> Scheduler<C, D, A, N> {
    /// Create an idle scheduler; usable in a `static`. Call [`init`](Self::init) before use.
    pub const fn new(clock: C, inputs: D, adc: A) -> Self {
        Self::with_thresholds(clock, inputs, adc, Thresholds::DEFAULT)
    }

    /// Scheduler with custom debounce limits; `thresholds` must satisfy
    /// [`Thresholds::is_valid`] or a pin can never report one of its edges.
    pub const fn with_thresholds(clock: C, inputs: D, adc: A, thresholds: Thresholds) -> Self {
        debug_assert!(thresholds.is_valid());
        Self {
            clock,
            inputs,
            thresholds,
            table: Mutex::new(RefCell::new(ScheduleTable::new())),
            counters: [const { EdgeCounter::new() }; N],
            scanner: Mutex::new(RefCell::new(AnalogScanner::new(adc))),
            samples: [const { AtomicU16::new(0) }; MAX_CHANNELS],
            scan_channels: AtomicU8::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Slot capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

impl<C, D, A, const N: usize> Scheduler<C, D, A, N>
where
    C: TickSource,
    D: DigitalInputs,
    A: AnalogSampler,
{
    /// Reset every slot, counter and sample and start scanning analog channels
    /// `0..analog_channels` (0 disables the scan). Safe to call again mid-run;
    /// tick processing is off until the reset completes.
    pub fn init(&self, analog_channels: u8) {
        self.initialized.store(false, Ordering::Release);

        let channels = critical_section::with(|cs| {
            self.table.borrow_ref_mut(cs).clear();
            self.scanner.borrow_ref_mut(cs).configure(analog_channels)
        });
        for counter in &self.counters {
            counter.clear();
        }
        for sample in &self.samples {
            sample.store(0, Ordering::Relaxed);
        }
        self.scan_channels.store(channels, Ordering::Release);

        self.initialized.store(true, Ordering::Release);
        log_info!("scheduler ready: {} slots, {} analog channels", N, channels);
    }

    /// Register or rearm `id` to fire `period_ms` from now.
    ///
    /// A one-shot with a zero period is registered inactive. Pin-watch ids take
    /// the pin's current level as their debounced level, so no edge is reported
    /// for the state the pin was already in. Rearming resets the slot's counters.
    pub fn arm(&self, id: SlotId, recurring: bool, period_ms: u32) -> Result<()> {
        let now = self.clock.now_ms();

        critical_section::with(|cs| -> Result<()> {
            let mut table = self.table.borrow_ref_mut(cs);
            let pos = table.arm(id, recurring, period_ms, now)?;

            if let Some(slot) = table.slot_mut(pos) {
                if let Some(pin) = slot.pin() {
                    let high = self.inputs.is_high(pin);
                    slot.debounce.snapshot(high, &self.thresholds);
                }
            }
            self.counters[pos].clear();
            Ok(())
        })
        .map_err(|err| {
            log_warn!("arm {} rejected: {}", id, err);
            err
        })
    }

    /// Stop `id` from firing. Its slot, debounced level and counters are kept.
    pub fn cancel(&self, id: SlotId) -> Result<()> {
        critical_section::with(|cs| self.table.borrow_ref_mut(cs).cancel(id))
            .map(|_| ())
            .map_err(|err| {
                log_debug!("cancel {}: {}", id, err);
                err
            })
    }

    /// True once per expiry of `id`. Pin watches also run one debounce cycle.
    ///
    /// The tick services pin watches on its own; the expiries it consumes are
    /// queued on the slot and handed out here, one per call.
    pub fn poll(&self, id: SlotId) -> bool {
        let now = self.clock.now_ms();
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            let Some(pos) = table.position(id) else {
                return false;
            };
            if self.service(&mut table, pos, now) {
                return true;
            }
            table
                .slot_mut(pos)
                .is_some_and(|slot| slot.take_pending())
        })
    }

    /// Debounced LOW to HIGH transition since the last `pin_rose`/`pin_fell` call
    pub fn pin_rose(&self, id: SlotId) -> bool {
        self.take_change(id, true)
    }

    /// Debounced HIGH to LOW transition since the last `pin_rose`/`pin_fell` call
    pub fn pin_fell(&self, id: SlotId) -> bool {
        self.take_change(id, false)
    }

    /// Current debounced level. Leaves the change flag alone.
    pub fn pin_level(&self, id: SlotId) -> bool {
        critical_section::with(|cs| {
            self.table
                .borrow_ref(cs)
                .find(id)
                .is_some_and(|slot| slot.debounce.level())
        })
    }

    /// Confirmed edges of one direction since the last reset of that direction.
    /// With `reset`, the count restarts from zero, or from the number of edges
    /// that landed while the reset was in progress.
    pub fn event_count(&self, id: SlotId, edge: Edge, reset: bool) -> u16 {
        let Some(pos) = critical_section::with(|cs| self.table.borrow_ref(cs).position(id)) else {
            return 0;
        };

        let counter = &self.counters[pos];
        if reset {
            counter.take(edge)
        } else {
            counter.read(edge)
        }
    }

    /// Most recent background sample of `channel`; 0 outside the scanned range
    pub fn analog_read(&self, channel: u8) -> u16 {
        if channel >= self.scan_channels.load(Ordering::Acquire) {
            return 0;
        }
        self.samples
            .get(channel as usize)
            .map_or(0, |sample| sample.load(Ordering::Relaxed))
    }

    /// Once-per-millisecond entry point for the tick interrupt.
    ///
    /// Must run after the clock has been advanced for this tick. Harvests and
    /// restarts the analog scan first, then gives every pin watch one debounce
    /// cycle, each in its own short critical section.
    pub fn on_tick(&self) {
        if !self.initialized.load(Ordering::Acquire) {
            return;
        }
        let now = self.clock.now_ms();

        let harvested = critical_section::with(|cs| self.scanner.borrow_ref_mut(cs).step());
        if let Some((channel, value)) = harvested {
            if let Some(sample) = self.samples.get(channel as usize) {
                sample.store(value, Ordering::Relaxed);
            }
        }

        for pos in 0..N {
            let more = critical_section::with(|cs| {
                let mut table = self.table.borrow_ref_mut(cs);
                let Some(id) = table.slot(pos).map(|slot| slot.id) else {
                    return false;
                };
                if watches_pin(id) && self.service(&mut table, pos, now) {
                    if let Some(slot) = table.slot_mut(pos) {
                        slot.pending = slot.pending.saturating_add(1);
                    }
                }
                true
            });
            if !more {
                break;
            }
        }
    }

    /// Expire the slot at `pos` if due and debounce its pin. Runs under a
    /// critical section so the counter update cannot race the tick.
    fn service(&self, table: &mut ScheduleTable<N>, pos: usize, now: u32) -> bool {
        let Some(slot) = table.slot_mut(pos) else {
            return false;
        };
        let Some(sampling) = slot.expire(now) else {
            return false;
        };

        if let Some(pin) = slot.pin() {
            let high = self.inputs.is_high(pin);
            if let Some(edge) = slot
                .debounce
                .sample(high, sampling.smoothing(), &self.thresholds)
            {
                self.counters[pos].record(edge);
            }
        }
        true
    }

    fn take_change(&self, id: SlotId, high: bool) -> bool {
        critical_section::with(|cs| {
            let mut table = self.table.borrow_ref_mut(cs);
            match table.find_mut(id) {
                Some(slot) if slot.active => {
                    slot.debounce.take_change() && slot.debounce.level() == high
                }
                _ => false,
            }
        })
    }
}
