//! Rotary-dial pulse decoder built on the scheduler.
//!
//! A dial interrupts its pulse contact once per unit (ten times for "0").
//! Every debounced break is counted by the tick interrupt; the decoder only
//! collects the count and waits for an inter-digit gap to close the digit.

use crate::config::INTERDIGIT_GAP_MS;
use crate::drivers::Edge;
use crate::error::Result;
use crate::hal::{AnalogSampler, DigitalInputs, TickSource};
use crate::rtos::{Scheduler, SlotId};
use crate::{log_debug, log_warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DialState {
    Idle,
    Dialing,
}

pub struct PulseDialDecoder {
    pulse_pin: SlotId,
    gap_timer: SlotId,
    state: DialState,
    pulses: u16,
}

impl PulseDialDecoder {
    pub const fn new(pulse_pin: SlotId, gap_timer: SlotId) -> Self {
        Self {
            pulse_pin,
            gap_timer,
            state: DialState::Idle,
            pulses: 0,
        }
    }

    pub fn state(&self) -> DialState {
        self.state
    }

    /// Watch the pulse pin every tick and register the (idle) gap timer
    pub fn start<C, D, A, const N: usize>(&mut self, sched: &Scheduler<C, D, A, N>) -> Result<()>
    where
        C: TickSource,
        D: DigitalInputs,
        A: AnalogSampler,
    {
        sched.arm(self.pulse_pin, true, 1)?;
        sched.arm(self.gap_timer, false, 0)?;
        self.state = DialState::Idle;
        self.pulses = 0;
        Ok(())
    }

    /// Call from the main loop. Yields a digit once the dial has been quiet
    /// for the inter-digit gap.
    pub fn update<C, D, A, const N: usize>(
        &mut self,
        sched: &Scheduler<C, D, A, N>,
    ) -> Result<Option<u8>>
    where
        C: TickSource,
        D: DigitalInputs,
        A: AnalogSampler,
    {
        let pulses = sched.event_count(self.pulse_pin, Edge::Rising, true);
        if pulses > 0 {
            self.pulses = self.pulses.saturating_add(pulses);
            self.state = DialState::Dialing;
            sched.arm(self.gap_timer, false, INTERDIGIT_GAP_MS)?;
        }

        if self.state == DialState::Dialing && sched.poll(self.gap_timer) {
            let count = core::mem::take(&mut self.pulses);
            self.state = DialState::Idle;
            return Ok(match count {
                1..=9 => Some(count as u8),
                10 => Some(0),
                _ => {
                    log_warn!("discarding {} pulses", count);
                    None
                }
            });
        }
        Ok(None)
    }
}

/// Spin until `id` expires. Blocks the foreground loop, so keep it to startup delays.
pub fn wait_for<C, D, A, const N: usize>(sched: &Scheduler<C, D, A, N>, id: SlotId)
where
    C: TickSource,
    D: DigitalInputs,
    A: AnalogSampler,
{
    log_debug!("waiting on slot {}", id);
    while !sched.poll(id) {
        core::hint::spin_loop();
    }
}
