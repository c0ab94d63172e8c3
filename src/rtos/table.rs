//! Fixed-capacity schedule table.
//!
//! Slots live in an arena and keep their position once allocated, so the
//! per-slot edge counters can be kept in a parallel array. Lookup is a
//! linear scan, which is fine at this table size.

use super::slot::{Slot, SlotId};
use crate::error::{Result, ScheduleError};
use heapless::Vec;

pub struct ScheduleTable<const N: usize> {
    slots: Vec<Slot, N>,
}

impl<const N: usize> ScheduleTable<N> {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn position(&self, id: SlotId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    #[inline]
    pub fn slot(&self, pos: usize) -> Option<&Slot> {
        self.slots.get(pos)
    }

    #[inline]
    pub fn slot_mut(&mut self, pos: usize) -> Option<&mut Slot> {
        self.slots.get_mut(pos)
    }

    pub fn find(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn find_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    /// (Re)arm `id`, allocating a slot for a new id. Returns the slot position.
    /// A full table is left untouched.
    pub fn arm(&mut self, id: SlotId, recurring: bool, period_ms: u32, now: u32) -> Result<usize> {
        let pos = match self.position(id) {
            Some(pos) => pos,
            None => {
                self.slots
                    .push(Slot::new(id))
                    .map_err(|_| ScheduleError::TableFull)?;
                self.slots.len() - 1
            }
        };

        self.slots[pos].rearm(recurring, period_ms, now);
        Ok(pos)
    }

    /// Deactivate `id`, keeping its slot for a later rearm
    pub fn cancel(&mut self, id: SlotId) -> Result<usize> {
        let pos = self.position(id).ok_or(ScheduleError::UnknownId)?;
        self.slots[pos].deactivate();
        Ok(pos)
    }
}

impl<const N: usize> Default for ScheduleTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
