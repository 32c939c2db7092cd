//! Shared pipeline state and doubles for the integration tests.
#![allow(dead_code)]

use bitbuf::BitBuffer;
use encoder::{BoolEncoder, FlagsEncoder, FloatEncoder, IntEncoder, TagEncoder};
use replica::{
    lerp, read_mask, snap, write_mask, DirtyFlags, FrameResult, State,
};
use replication::{Controller, Logic};

/// A pawn-like state exercising every encoder family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeState {
    pub archetype: u32,
    pub x: f32,
    pub y: f32,
    pub status: i32,
    pub alive: bool,
}

impl PipeState {
    pub const FIELD_ARCHETYPE: u32 = 0;
    pub const FIELD_X: u32 = 1;
    pub const FIELD_Y: u32 = 2;
    pub const FIELD_STATUS: u32 = 3;
    pub const FIELD_ALIVE: u32 = 4;

    const MASK: FlagsEncoder = FlagsEncoder::for_fields(5);

    pub fn at(x: f32, y: f32) -> Self {
        Self {
            archetype: 1,
            x,
            y,
            status: 0,
            alive: true,
        }
    }

    fn archetype_encoder() -> TagEncoder {
        TagEncoder::new(7)
    }

    fn coord_encoder() -> FloatEncoder {
        FloatEncoder::new(-512.0, 512.0, 0.01).unwrap()
    }

    fn status_encoder() -> IntEncoder {
        IntEncoder::new(-100, 100).unwrap()
    }

    /// Equality under the wire quantization, for end-to-end assertions.
    pub fn matches(&self, other: &Self) -> bool {
        self.dirty_flags(other).is_empty()
    }
}

impl State for PipeState {
    const FIELD_COUNT: u32 = 5;
    const PRIVATE_FLAGS: DirtyFlags = DirtyFlags::field(Self::FIELD_STATUS);

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn copy_from(&mut self, other: &Self) {
        *self = other.clone();
    }

    fn dirty_flags(&self, basis: &Self) -> DirtyFlags {
        use bitbuf::Encoder;
        let coord = Self::coord_encoder();
        let mut flags = DirtyFlags::EMPTY;
        if self.archetype != basis.archetype {
            flags |= DirtyFlags::field(Self::FIELD_ARCHETYPE);
        }
        if !coord.equal(&self.x, &basis.x) {
            flags |= DirtyFlags::field(Self::FIELD_X);
        }
        if !coord.equal(&self.y, &basis.y) {
            flags |= DirtyFlags::field(Self::FIELD_Y);
        }
        if self.status != basis.status {
            flags |= DirtyFlags::field(Self::FIELD_STATUS);
        }
        if self.alive != basis.alive {
            flags |= DirtyFlags::field(Self::FIELD_ALIVE);
        }
        flags
    }

    fn encode(&self, buf: &mut BitBuffer, flags: DirtyFlags) {
        let coord = Self::coord_encoder();
        let bits = flags.bits();
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_ALIVE).bits(),
            &BoolEncoder,
            &self.alive,
        );
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_STATUS).bits(),
            &Self::status_encoder(),
            &self.status,
        );
        buf.push_if(bits, DirtyFlags::field(Self::FIELD_Y).bits(), &coord, &self.y);
        buf.push_if(bits, DirtyFlags::field(Self::FIELD_X).bits(), &coord, &self.x);
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_ARCHETYPE).bits(),
            &Self::archetype_encoder(),
            &self.archetype,
        );
        write_mask(buf, &Self::MASK, flags);
    }

    fn decode(buf: &mut BitBuffer, basis: &Self) -> FrameResult<(Self, DirtyFlags)> {
        let coord = Self::coord_encoder();
        let flags = read_mask(buf, &Self::MASK, Self::FIELD_COUNT)?;
        let bits = flags.bits();
        let archetype = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_ARCHETYPE).bits(),
            &Self::archetype_encoder(),
            &basis.archetype,
        )?;
        let x = buf.pop_if(bits, DirtyFlags::field(Self::FIELD_X).bits(), &coord, &basis.x)?;
        let y = buf.pop_if(bits, DirtyFlags::field(Self::FIELD_Y).bits(), &coord, &basis.y)?;
        let status = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_STATUS).bits(),
            &Self::status_encoder(),
            &basis.status,
        )?;
        let alive = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_ALIVE).bits(),
            &BoolEncoder,
            &basis.alive,
        )?;
        Ok((
            Self {
                archetype,
                x,
                y,
                status,
                alive,
            },
            flags,
        ))
    }

    fn apply_delta(&mut self, partial: &Self, flags: DirtyFlags) {
        if flags.contains(DirtyFlags::field(Self::FIELD_ARCHETYPE)) {
            self.archetype = partial.archetype;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_X)) {
            self.x = partial.x;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_Y)) {
            self.y = partial.y;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_STATUS)) {
            self.status = partial.status;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_ALIVE)) {
            self.alive = partial.alive;
        }
    }

    fn apply_smoothed(&mut self, a: &Self, b: &Self, t: f32) {
        self.archetype = snap(&a.archetype, &b.archetype, t);
        self.x = lerp(a.x, b.x, t);
        self.y = lerp(a.y, b.y, t);
        self.status = snap(&a.status, &b.status, t);
        self.alive = snap(&a.alive, &b.alive, t);
    }
}

/// Pipeline logic: commands displace the pawn along x.
#[derive(Debug, Default)]
pub struct PipeLogic;

impl Logic for PipeLogic {
    type State = PipeState;
    type Command = f32;

    fn on_simulate_command(&mut self, state: &mut PipeState, command: &f32) {
        state.x += command;
    }
}

/// Controller double fed from a plain vector.
#[derive(Debug, Default)]
pub struct PipeController {
    pub commands: Vec<f32>,
}

impl Controller for PipeController {
    type Command = f32;

    fn latest_command(&self) -> Option<&f32> {
        self.commands.last()
    }

    fn pending_commands(&self) -> &[f32] {
        &self.commands
    }
}

/// Deterministic xorshift generator for seeded chaos tests.
#[derive(Debug)]
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 32) as u32
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}
