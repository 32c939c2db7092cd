//! Transmitted per-entity updates and their wire frames.

use bitbuf::BitBuffer;
use encoder::BoolEncoder;

use crate::error::FrameResult;
use crate::flags::DirtyFlags;
use crate::state::State;
use crate::types::{EntityId, EntityIdEncoder, HasTick, Tick, TickEncoder};

/// A transmitted update for one entity at one tick.
///
/// Either an update frame carrying a partial state and its dirty mask, or a
/// destruction frame carrying the removal tick. `has_immutable` marks a
/// frame a receiver may bootstrap a state from (first send, or a promoted
/// full snapshot after basis loss).
#[derive(Debug, Clone)]
pub struct StateDelta<S> {
    entity_id: EntityId,
    tick: Tick,
    flags: DirtyFlags,
    state: Option<S>,
    has_immutable: bool,
    is_destroyed: bool,
    removed_tick: Tick,
}

impl<S: State> StateDelta<S> {
    /// Creates an update frame.
    #[must_use]
    pub fn update(
        entity_id: EntityId,
        tick: Tick,
        state: S,
        flags: DirtyFlags,
        has_immutable: bool,
    ) -> Self {
        Self {
            entity_id,
            tick,
            flags,
            state: Some(state),
            has_immutable,
            is_destroyed: false,
            removed_tick: Tick::INVALID,
        }
    }

    /// Creates a destruction frame.
    #[must_use]
    pub fn destruction(entity_id: EntityId, tick: Tick, removed_tick: Tick) -> Self {
        Self {
            entity_id,
            tick,
            flags: DirtyFlags::EMPTY,
            state: None,
            has_immutable: false,
            is_destroyed: true,
            removed_tick,
        }
    }

    /// The entity this frame updates.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// The dirty mask of the carried partial state.
    #[must_use]
    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    /// The carried partial state; `None` for destruction frames.
    #[must_use]
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    /// Whether a receiver may initialize a state from this frame alone.
    #[must_use]
    pub fn has_immutable(&self) -> bool {
        self.has_immutable
    }

    /// Whether this frame signals entity destruction.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.is_destroyed
    }

    /// The scheduled removal tick; invalid unless destroyed.
    #[must_use]
    pub fn removed_tick(&self) -> Tick {
        self.removed_tick
    }

    /// Pushes this frame onto a buffer.
    ///
    /// Push order is the reverse of the receiver's pop order: payload first,
    /// control bits, tick, entity id last.
    pub fn encode(&self, buf: &mut BitBuffer) {
        if self.is_destroyed {
            buf.push_with(&TickEncoder, &self.removed_tick);
        } else if let Some(state) = &self.state {
            state.encode(buf, self.flags);
        } else {
            debug_assert!(false, "update frame without a state");
        }
        buf.push_with(&BoolEncoder, &self.is_destroyed);
        buf.push_with(&BoolEncoder, &self.has_immutable);
        buf.push_with(&TickEncoder, &self.tick);
        buf.push_with(&EntityIdEncoder, &self.entity_id);
    }

    /// Pops one frame off a buffer.
    ///
    /// The partial state of an update frame decodes against the zero state;
    /// the mask records which fields are genuinely present.
    ///
    /// # Errors
    ///
    /// [`FrameError`](crate::FrameError) on underrun or a dirty mask this
    /// state layout does not know. Both leave no partial observable state:
    /// the caller discards the frame.
    pub fn decode(buf: &mut BitBuffer) -> FrameResult<Self> {
        let entity_id = buf.pop_with(&EntityIdEncoder)?;
        let tick = buf.pop_with(&TickEncoder)?;
        let has_immutable = buf.pop_with(&BoolEncoder)?;
        let is_destroyed = buf.pop_with(&BoolEncoder)?;

        if is_destroyed {
            let removed_tick = buf.pop_with(&TickEncoder)?;
            return Ok(Self::destruction(entity_id, tick, removed_tick));
        }

        let (state, flags) = S::decode(buf, &S::default())?;
        Ok(Self {
            entity_id,
            tick,
            flags,
            state: Some(state),
            has_immutable,
            is_destroyed: false,
            removed_tick: Tick::INVALID,
        })
    }
}

impl<S> HasTick for StateDelta<S> {
    fn tick(&self) -> Tick {
        self.tick
    }
}
