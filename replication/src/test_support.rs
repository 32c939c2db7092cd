//! Shared state, logic, and controller doubles for this crate's unit tests.

use bitbuf::BitBuffer;
use encoder::{FlagsEncoder, FloatEncoder, IntEncoder};
use replica::{lerp, read_mask, write_mask, DirtyFlags, FrameResult, State};

use crate::traits::{Controller, Logic};

/// Two-field test state: a smoothed coordinate and a private integer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestState {
    pub x: f32,
    pub hp: i32,
}

impl TestState {
    pub const FIELD_X: u32 = 0;
    pub const FIELD_HP: u32 = 1;

    const MASK: FlagsEncoder = FlagsEncoder::for_fields(2);

    fn x_encoder() -> FloatEncoder {
        FloatEncoder::new(-1000.0, 1000.0, 0.01).unwrap()
    }

    fn hp_encoder() -> IntEncoder {
        IntEncoder::new(-1000, 1000).unwrap()
    }
}

impl State for TestState {
    const FIELD_COUNT: u32 = 2;
    const PRIVATE_FLAGS: DirtyFlags = DirtyFlags::field(Self::FIELD_HP);

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn copy_from(&mut self, other: &Self) {
        self.x = other.x;
        self.hp = other.hp;
    }

    fn dirty_flags(&self, basis: &Self) -> DirtyFlags {
        use bitbuf::Encoder;
        let mut flags = DirtyFlags::EMPTY;
        if !Self::x_encoder().equal(&self.x, &basis.x) {
            flags |= DirtyFlags::field(Self::FIELD_X);
        }
        if self.hp != basis.hp {
            flags |= DirtyFlags::field(Self::FIELD_HP);
        }
        flags
    }

    fn encode(&self, buf: &mut BitBuffer, flags: DirtyFlags) {
        let bits = flags.bits();
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_HP).bits(),
            &Self::hp_encoder(),
            &self.hp,
        );
        buf.push_if(
            bits,
            DirtyFlags::field(Self::FIELD_X).bits(),
            &Self::x_encoder(),
            &self.x,
        );
        write_mask(buf, &Self::MASK, flags);
    }

    fn decode(buf: &mut BitBuffer, basis: &Self) -> FrameResult<(Self, DirtyFlags)> {
        let flags = read_mask(buf, &Self::MASK, Self::FIELD_COUNT)?;
        let bits = flags.bits();
        let x = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_X).bits(),
            &Self::x_encoder(),
            &basis.x,
        )?;
        let hp = buf.pop_if(
            bits,
            DirtyFlags::field(Self::FIELD_HP).bits(),
            &Self::hp_encoder(),
            &basis.hp,
        )?;
        Ok((Self { x, hp }, flags))
    }

    fn apply_delta(&mut self, partial: &Self, flags: DirtyFlags) {
        if flags.contains(DirtyFlags::field(Self::FIELD_X)) {
            self.x = partial.x;
        }
        if flags.contains(DirtyFlags::field(Self::FIELD_HP)) {
            self.hp = partial.hp;
        }
    }

    fn apply_smoothed(&mut self, a: &Self, b: &Self, t: f32) {
        self.x = lerp(a.x, b.x, t);
        self.hp = lerp(a.hp as f32, b.hp as f32, t).round() as i32;
    }
}

/// Logic double recording lifecycle callbacks; commands push the coordinate.
#[derive(Debug, Default)]
pub struct TestLogic {
    pub events: Vec<&'static str>,
}

impl Logic for TestLogic {
    type State = TestState;
    type Command = i32;

    fn on_start(&mut self, _state: &mut TestState) {
        self.events.push("start");
    }

    fn on_shutdown(&mut self, _state: &mut TestState) {
        self.events.push("shutdown");
    }

    fn on_controller_changed(&mut self, _state: &mut TestState, owned: bool) {
        self.events
            .push(if owned { "controller:owned" } else { "controller:remote" });
    }

    fn on_simulate_command(&mut self, state: &mut TestState, command: &i32) {
        state.x += *command as f32;
    }

    fn on_frozen(&mut self, _state: &TestState) {
        self.events.push("frozen");
    }

    fn on_unfrozen(&mut self, _state: &TestState) {
        self.events.push("unfrozen");
    }
}

/// Controller double fed from a plain vector.
#[derive(Debug, Default)]
pub struct VecController {
    pub commands: Vec<i32>,
}

impl Controller for VecController {
    type Command = i32;

    fn latest_command(&self) -> Option<&i32> {
        self.commands.last()
    }

    fn pending_commands(&self) -> &[i32] {
        &self.commands
    }
}
