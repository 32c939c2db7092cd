//! Tick-stamped state snapshots kept in history.

use crate::state::State;
use crate::types::{HasTick, Tick};

/// An immutable `(tick, state)` snapshot.
///
/// The record owns an independent clone of the state it was created from;
/// it never aliases the live state it snapshotted.
#[derive(Debug, Clone)]
pub struct StateRecord<S> {
    tick: Tick,
    state: S,
}

impl<S: State> StateRecord<S> {
    /// Creates a record holding a clone of `state`.
    #[must_use]
    pub fn create(tick: Tick, state: &S) -> Self {
        Self {
            tick,
            state: state.clone(),
        }
    }

    /// Creates the next history record, suppressing trivial entries.
    ///
    /// Returns `None` when `state` equals the previous record's state under
    /// encoder equivalence; an unchanged entity then adds nothing to the
    /// outgoing history.
    #[must_use]
    pub fn create_next(tick: Tick, state: &S, prev: Option<&Self>) -> Option<Self> {
        if let Some(prev) = prev {
            if state.dirty_flags(&prev.state).is_empty() {
                return None;
            }
        }
        Some(Self::create(tick, state))
    }

    /// The stamping tick.
    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// The recorded state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Consumes the record and yields the owned state.
    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> HasTick for StateRecord<S> {
    fn tick(&self) -> Tick {
        self.tick
    }
}
