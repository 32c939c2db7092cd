//! Tick-indexed ring buffer absorbing out-of-order arrivals.

use std::num::{NonZeroU32, NonZeroUsize};

use replica::{HasTick, Tick};
use tracing::trace;

/// A ring of fixed capacity indexed by `(tick / divisor) % capacity`.
///
/// The divisor is the network send rate: only ticks at the send cadence
/// occupy distinct slots, so the ring covers `capacity * divisor` ticks of
/// history. A slot collision evicts the older item; an arrival older than
/// (or as old as) its slot's occupant is dropped silently. Memory is bounded
/// by construction.
#[derive(Debug)]
pub struct DejitterBuffer<T> {
    slots: Vec<Option<T>>,
    divisor: u32,
    latest_slot: Option<usize>,
}

impl<T: HasTick> DejitterBuffer<T> {
    /// Creates a buffer with `capacity` slots and the given tick divisor.
    #[must_use]
    pub fn new(capacity: NonZeroUsize, divisor: NonZeroU32) -> Self {
        let mut slots = Vec::with_capacity(capacity.get());
        slots.resize_with(capacity.get(), || None);
        Self {
            slots,
            divisor: divisor.get(),
            latest_slot: None,
        }
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no item is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latest_slot.is_none()
    }

    fn slot_of(&self, tick: Tick) -> usize {
        ((tick.raw() / self.divisor) as usize) % self.slots.len()
    }

    /// Stores an item, replacing an older occupant of its slot.
    ///
    /// Returns `false` when the item was dropped as stale: its slot already
    /// holds an item with an equal or newer tick.
    pub fn store(&mut self, item: T) -> bool {
        let tick = item.tick();
        let slot = self.slot_of(tick);
        if let Some(existing) = &self.slots[slot] {
            if existing.tick() >= tick {
                trace!(
                    incoming = tick.raw(),
                    stored = existing.tick().raw(),
                    "dropping stale arrival"
                );
                return false;
            }
        }

        let is_latest = match self.latest_slot.and_then(|i| self.slots[i].as_ref()) {
            Some(latest) => latest.tick() < tick,
            None => true,
        };
        self.slots[slot] = Some(item);
        if is_latest {
            self.latest_slot = Some(slot);
        }
        true
    }

    /// The item with the greatest stored tick.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.latest_slot.and_then(|i| self.slots[i].as_ref())
    }

    /// The item with the largest tick at or before `tick`.
    #[must_use]
    pub fn get_latest_at(&self, tick: Tick) -> Option<&T> {
        self.slots
            .iter()
            .flatten()
            .filter(|item| item.tick() <= tick)
            .max_by_key(|item| item.tick())
    }

    /// The item at or before `tick` plus the next item after it.
    ///
    /// When nothing is stored at or before `tick`, the lookahead anchors at
    /// `tick` itself so an un-bootstrapped consumer still sees upcoming
    /// items.
    #[must_use]
    pub fn get_range_at(&self, tick: Tick) -> (Option<&T>, Option<&T>) {
        let cur = self.get_latest_at(tick);
        let anchor = cur.map_or(tick, HasTick::tick);
        let next = self
            .slots
            .iter()
            .flatten()
            .filter(|item| item.tick() > anchor)
            .min_by_key(|item| item.tick());
        (cur, next)
    }

    /// Iterates stored items with tick greater than `tick`, ascending.
    pub fn get_latest_from(&self, tick: Tick) -> LatestFrom<'_, T> {
        LatestFrom {
            buffer: self,
            floor: tick,
        }
    }
}

/// Single-pass ascending iterator over items newer than a floor tick.
#[derive(Debug)]
pub struct LatestFrom<'a, T> {
    buffer: &'a DejitterBuffer<T>,
    floor: Tick,
}

impl<'a, T: HasTick> Iterator for LatestFrom<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let next = self
            .buffer
            .slots
            .iter()
            .flatten()
            .filter(|item| item.tick() > self.floor)
            .min_by_key(|item| item.tick())?;
        self.floor = next.tick();
        Some(next)
    }
}
