//! Core identifier types for replication.

use std::ops::{Add, Sub};

use bitbuf::Encoder;

/// A simulation tick number.
///
/// Ticks stamp simulation steps and define a total order. The zero value is
/// [`Tick::INVALID`] and orders below every valid tick; valid ticks start
/// at 1. Wraparound is not handled: the 32-bit horizon outlasts any session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(u32);

impl Tick {
    /// The invalid sentinel, less than all valid ticks.
    pub const INVALID: Self = Self(0);

    /// Creates a tick from a raw counter value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` unless this is the invalid sentinel.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Converts this tick to simulation time.
    #[must_use]
    pub fn time_seconds(self, seconds_per_tick: f32) -> f32 {
        self.0 as f32 * seconds_per_tick
    }
}

impl Add<u32> for Tick {
    type Output = Tick;

    fn add(self, rhs: u32) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl Sub for Tick {
    type Output = i64;

    /// Signed tick delta; negative when `rhs` is ahead.
    fn sub(self, rhs: Tick) -> i64 {
        i64::from(self.0) - i64::from(rhs.0)
    }
}

impl From<u32> for Tick {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Tick> for u32 {
    fn from(tick: Tick) -> Self {
        tick.0
    }
}

/// A stable entity identifier, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityId(u32);

impl EntityId {
    /// The invalid sentinel.
    pub const INVALID: Self = Self(0);

    /// Creates an entity id from a raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` unless this is the invalid sentinel.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl From<u32> for EntityId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Anything stamped with a tick; required by the tick-indexed buffers.
pub trait HasTick {
    /// The stamping tick.
    fn tick(&self) -> Tick;
}

/// Full-width wire encoder for [`Tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEncoder;

impl Encoder for TickEncoder {
    type Value = Tick;

    fn required_bits(&self) -> u32 {
        32
    }

    fn pack(&self, value: &Tick) -> u32 {
        value.raw()
    }

    fn unpack(&self, bits: u32) -> Tick {
        Tick::new(bits)
    }

    fn equal(&self, a: &Tick, b: &Tick) -> bool {
        a == b
    }
}

/// Full-width wire encoder for [`EntityId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityIdEncoder;

impl Encoder for EntityIdEncoder {
    type Value = EntityId;

    fn required_bits(&self) -> u32 {
        32
    }

    fn pack(&self, value: &EntityId) -> u32 {
        value.raw()
    }

    fn unpack(&self, bits: u32) -> EntityId {
        EntityId::new(bits)
    }

    fn equal(&self, a: &EntityId, b: &EntityId) -> bool {
        a == b
    }
}
