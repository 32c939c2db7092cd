//! Reference pawn state and logic for the demo simulation.
//!
//! One concrete implementation of the [`replica::State`] and
//! [`replication::Logic`] contracts, shared by the demo simulator and the
//! integration tests. The pawn exercises every encoder family: an archetype
//! tag, an owner tag, quantized coordinates and heading, a bounded status
//! integer, and a controller-private energy field.

use bitbuf::{BitBuffer, Encoder};
use encoder::{FlagsEncoder, FloatEncoder, IntEncoder, TagEncoder};
use replica::{
    lerp, read_mask, snap, write_mask, DirtyFlags, FrameResult, State,
};
use replication::{Factory, FactoryKind, Logic};

/// Coordinate bounds, world units.
pub const POS_MIN: f32 = -512.0;
/// Coordinate bounds, world units.
pub const POS_MAX: f32 = 512.0;
/// Coordinate resolution, world units.
pub const POS_STEP: f32 = 0.01;
/// Heading resolution, degrees.
pub const HEADING_STEP: f32 = 0.1;
/// Largest archetype tag.
pub const ARCHETYPE_MAX: u32 = 7;
/// Largest owner tag.
pub const OWNER_MAX: u32 = 255;

/// The replicated pawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PawnState {
    /// Registered visual/behavior archetype.
    pub archetype: u32,
    /// Owning peer tag; 0 means unowned.
    pub owner: u32,
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Facing, degrees in `[0, 360)`.
    pub heading: f32,
    /// Gameplay status code.
    pub status: i32,
    /// Input energy; replicated only to the controlling peer.
    pub energy: i32,
}

impl PawnState {
    pub const FIELD_ARCHETYPE: u32 = 0;
    pub const FIELD_OWNER: u32 = 1;
    pub const FIELD_X: u32 = 2;
    pub const FIELD_Y: u32 = 3;
    pub const FIELD_HEADING: u32 = 4;
    pub const FIELD_STATUS: u32 = 5;
    pub const FIELD_ENERGY: u32 = 6;

    const MASK: FlagsEncoder = FlagsEncoder::for_fields(7);

    fn archetype_encoder() -> TagEncoder {
        TagEncoder::new(ARCHETYPE_MAX)
    }

    fn owner_encoder() -> TagEncoder {
        TagEncoder::new(OWNER_MAX)
    }

    fn coord_encoder() -> FloatEncoder {
        FloatEncoder::new(POS_MIN, POS_MAX, POS_STEP).expect("demo coordinate range must be valid")
    }

    fn heading_encoder() -> FloatEncoder {
        FloatEncoder::new(0.0, 360.0, HEADING_STEP).expect("demo heading range must be valid")
    }

    fn status_encoder() -> IntEncoder {
        IntEncoder::new(-1000, 1000).expect("demo status range must be valid")
    }

    fn energy_encoder() -> IntEncoder {
        IntEncoder::new(0, 100).expect("demo energy range must be valid")
    }

    /// Equality under the wire quantization.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.dirty_flags(other).is_empty()
    }
}

impl State for PawnState {
    const FIELD_COUNT: u32 = 7;
    const PRIVATE_FLAGS: DirtyFlags = DirtyFlags::field(Self::FIELD_ENERGY);

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn copy_from(&mut self, other: &Self) {
        *self = other.clone();
    }

    fn dirty_flags(&self, basis: &Self) -> DirtyFlags {
        let coord = Self::coord_encoder();
        let mut flags = DirtyFlags::EMPTY;
        if self.archetype != basis.archetype {
            flags |= DirtyFlags::field(Self::FIELD_ARCHETYPE);
        }
        if self.owner != basis.owner {
            flags |= DirtyFlags::field(Self::FIELD_OWNER);
        }
        if !coord.equal(&self.x, &basis.x) {
            flags |= DirtyFlags::field(Self::FIELD_X);
        }
        if !coord.equal(&self.y, &basis.y) {
            flags |= DirtyFlags::field(Self::FIELD_Y);
        }
        if !Self::heading_encoder().equal(&self.heading, &basis.heading) {
            flags |= DirtyFlags::field(Self::FIELD_HEADING);
        }
        if self.status != basis.status {
            flags |= DirtyFlags::field(Self::FIELD_STATUS);
        }
        if self.energy != basis.energy {
            flags |= DirtyFlags::field(Self::FIELD_ENERGY);
        }
        flags
    }

    fn encode(&self, buf: &mut BitBuffer, flags: DirtyFlags) {
        let coord = Self::coord_encoder();
        let bits = flags.bits();
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_ENERGY).bits(),
            &Self::energy_encoder(),
            &self.energy,
        );
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_STATUS).bits(),
            &Self::status_encoder(),
            &self.status,
        );
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_HEADING).bits(),
            &Self::heading_encoder(),
            &self.heading,
        );
        buf.push_if(bits, DirtyFlags::field(Self::FIELD_Y).bits(), &coord, &self.y);
        buf.push_if(bits, DirtyFlags::field(Self::FIELD_X).bits(), &coord, &self.x);
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_OWNER).bits(),
            &Self::owner_encoder(),
            &self.owner,
        );
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
        let owner = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_OWNER).bits(),
            &Self::owner_encoder(),
            &basis.owner,
        )?;
        let x = buf.pop_if(bits, DirtyFlags::field(Self::FIELD_X).bits(), &coord, &basis.x)?;
        let y = buf.pop_if(bits, DirtyFlags::field(Self::FIELD_Y).bits(), &coord, &basis.y)?;
        let heading = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_HEADING).bits(),
            &Self::heading_encoder(),
            &basis.heading,
        )?;
        let status = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_STATUS).bits(),
            &Self::status_encoder(),
            &basis.status,
        )?;
        let energy = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_ENERGY).bits(),
            &Self::energy_encoder(),
            &basis.energy,
        )?;
        Ok((
            Self {
                archetype,
                owner,
                x,
                y,
                heading,
                status,
                energy,
            },
            flags,
        ))
    }

    fn apply_delta(&mut self, partial: &Self, flags: DirtyFlags) {
        if flags.contains(DirtyFlags::field(Self::FIELD_ARCHETYPE)) {
            self.archetype = partial.archetype;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_OWNER)) {
            self.owner = partial.owner;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_X)) {
            self.x = partial.x;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_Y)) {
            self.y = partial.y;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_HEADING)) {
            self.heading = partial.heading;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_STATUS)) {
            self.status = partial.status;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_ENERGY)) {
            self.energy = partial.energy;
        }
    }

    fn apply_smoothed(&mut self, a: &Self, b: &Self, t: f32) {
        self.archetype = snap(&a.archetype, &b.archetype, t);
        self.owner = snap(&a.owner, &b.owner, t);
        self.x = lerp(a.x, b.x, t);
        self.y = lerp(a.y, b.y, t);
        self.heading = lerp(a.heading, b.heading, t);
        self.status = snap(&a.status, &b.status, t);
        self.energy = snap(&a.energy, &b.energy, t);
    }
}

/// One movement input for a pawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PawnCommand {
    /// Displacement along x for one tick.
    pub dx: f32,
    /// Displacement along y for one tick.
    pub dy: f32,
}

/// Pawn simulation: velocity integration plus command displacement.
#[derive(Debug, Clone, Default)]
pub struct PawnLogic {
    /// Per-tick drift applied by `on_simulate`.
    pub velocity: (f32, f32),
}

impl Logic for PawnLogic {
    type State = PawnState;
    type Command = PawnCommand;

    fn on_simulate(&mut self, state: &mut PawnState) {
        state.x = (state.x + self.velocity.0).clamp(POS_MIN, POS_MAX);
        state.y = (state.y + self.velocity.1).clamp(POS_MIN, POS_MAX);
    }

    fn on_simulate_command(&mut self, state: &mut PawnState, command: &PawnCommand) {
        state.x = (state.x + command.dx).clamp(POS_MIN, POS_MAX);
        state.y = (state.y + command.dy).clamp(POS_MIN, POS_MAX);
        state.energy = (state.energy - 1).max(0);
    }
}

/// Spawns pawn logic; drifting for even kinds, inert for odd ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct PawnFactory;

impl Factory for PawnFactory {
    type Logic = PawnLogic;

    fn create(&self, kind: FactoryKind) -> PawnLogic {
        let drift = if kind.raw() % 2 == 0 { 0.25 } else { 0.0 };
        PawnLogic {
            velocity: (drift, drift * 0.5),
        }
    }
}
