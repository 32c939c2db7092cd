//! Minimal state implementation shared by this crate's unit tests.

use bitbuf::BitBuffer;
use encoder::{BoolEncoder, FlagsEncoder, FloatEncoder, IntEncoder};

use crate::error::FrameResult;
use crate::flags::DirtyFlags;
use crate::state::{lerp, read_mask, snap, write_mask, State};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestState {
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub armed: bool,
}

impl TestState {
    pub const FIELD_X: u32 = 0;
    pub const FIELD_Y: u32 = 1;
    pub const FIELD_HP: u32 = 2;
    pub const FIELD_ARMED: u32 = 3;

    const MASK: FlagsEncoder = FlagsEncoder::for_fields(4);

    pub fn sample() -> Self {
        Self {
            x: 10.0,
            y: 20.0,
            hp: 5,
            armed: false,
        }
    }

    fn coord_encoder() -> FloatEncoder {
        FloatEncoder::new(-1000.0, 1000.0, 0.01).unwrap()
    }

    fn hp_encoder() -> IntEncoder {
        IntEncoder::new(-100, 100).unwrap()
    }
}

impl State for TestState {
    const FIELD_COUNT: u32 = 4;

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn copy_from(&mut self, other: &Self) {
        self.x = other.x;
        self.y = other.y;
        self.hp = other.hp;
        self.armed = other.armed;
    }

    fn dirty_flags(&self, basis: &Self) -> DirtyFlags {
        use bitbuf::Encoder;
        let coord = Self::coord_encoder();
        let mut flags = DirtyFlags::EMPTY;
        if !coord.equal(&self.x, &basis.x) {
            flags |= DirtyFlags::field(Self::FIELD_X);
        }
        if !coord.equal(&self.y, &basis.y) {
            flags |= DirtyFlags::field(Self::FIELD_Y);
        }
        if self.hp != basis.hp {
            flags |= DirtyFlags::field(Self::FIELD_HP);
        }
        if self.armed != basis.armed {
            flags |= DirtyFlags::field(Self::FIELD_ARMED);
        }
        flags
    }

    fn encode(&self, buf: &mut BitBuffer, flags: DirtyFlags) {
        let coord = Self::coord_encoder();
        let bits = flags.bits();
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_ARMED).bits(),
            &BoolEncoder,
            &self.armed,
        );
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_HP).bits(),
            &Self::hp_encoder(),
            &self.hp,
        );
        buf.push_if(bits, DirtyFlags::field(Self::FIELD_Y).bits(), &coord, &self.y);
        buf.push_if(bits, DirtyFlags::field(Self::FIELD_X).bits(), &coord, &self.x);
        write_mask(buf, &Self::MASK, flags);
    }

    fn decode(buf: &mut BitBuffer, basis: &Self) -> FrameResult<(Self, DirtyFlags)> {
        let coord = Self::coord_encoder();
        let flags = read_mask(buf, &Self::MASK, Self::FIELD_COUNT)?;
        let bits = flags.bits();
        let x = buf.pop_if(bits, DirtyFlags::field(Self::FIELD_X).bits(), &coord, &basis.x)?;
        let y = buf.pop_if(bits, DirtyFlags::field(Self::FIELD_Y).bits(), &coord, &basis.y)?;
        let hp = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_HP).bits(),
            &Self::hp_encoder(),
            &basis.hp,
        )?;
        let armed = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_ARMED).bits(),
            &BoolEncoder,
            &basis.armed,
        )?;
        Ok((Self { x, y, hp, armed }, flags))
    }

    fn apply_delta(&mut self, partial: &Self, flags: DirtyFlags) {
        if flags.contains(DirtyFlags::field(Self::FIELD_X)) {
            self.x = partial.x;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_Y)) {
            self.y = partial.y;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_HP)) {
            self.hp = partial.hp;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_ARMED)) {
            self.armed = partial.armed;
        }
    }

    fn apply_smoothed(&mut self, a: &Self, b: &Self, t: f32) {
        self.x = lerp(a.x, b.x, t);
        self.y = lerp(a.y, b.y, t);
        self.hp = lerp(a.hp as f32, b.hp as f32, t).round() as i32;
        self.armed = snap(&a.armed, &b.armed, t);
    }
}
