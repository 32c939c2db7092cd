//! Interpolation and extrapolation for remote entities.

use replica::{HasTick, State, StateDelta, StateRecord, Tick};
use tracing::debug;

use crate::dejitter::DejitterBuffer;

/// Rolling confirmed-state window for a remote entity.
///
/// Holds up to three records — `prev`, `cur`, `next` — advanced from the
/// incoming dejitter buffer each tick, plus a cached output state so frame
/// smoothing does not allocate. Rendering interpolates `cur -> next` when a
/// lookahead exists and extrapolates from `prev -> cur` otherwise.
#[derive(Debug)]
pub struct SmoothingBuffer<S> {
    prev: Option<StateRecord<S>>,
    cur: Option<StateRecord<S>>,
    next: Option<StateRecord<S>>,
    output: Option<S>,
    seconds_per_tick: f32,
}

impl<S: State> SmoothingBuffer<S> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new(seconds_per_tick: f32) -> Self {
        Self {
            prev: None,
            cur: None,
            next: None,
            output: None,
            seconds_per_tick,
        }
    }

    /// Tick of the current confirmed record, if bootstrapped.
    #[must_use]
    pub fn cur_tick(&self) -> Tick {
        self.cur.as_ref().map_or(Tick::INVALID, StateRecord::tick)
    }

    /// Advances the window from the dejitter buffer and returns the
    /// confirmed state at or before `now`.
    ///
    /// The first acquisition requires a frame carrying immutable data; a
    /// bootstrap frame without it is an upstream protocol violation and is
    /// skipped defensively. `next` is recomputed from scratch every call so
    /// it only ever reflects the current tick's lookahead.
    pub fn update(&mut self, now: Tick, incoming: &DejitterBuffer<StateDelta<S>>) -> Option<&S> {
        let (cur_delta, next_delta) = incoming.get_range_at(now);

        if self.cur.is_none() {
            let delta = cur_delta?;
            debug_assert!(
                delta.has_immutable(),
                "bootstrap delta must carry immutable data"
            );
            if !delta.has_immutable() {
                debug!(
                    tick = delta.tick().raw(),
                    "skipping bootstrap delta without immutable data"
                );
                return None;
            }
            let state = delta.state()?.clone();
            self.output = Some(state.clone());
            self.cur = Some(StateRecord::create(delta.tick(), &state));
        } else if let (Some(cur), Some(delta)) = (&self.cur, cur_delta) {
            if cur.tick() < delta.tick() {
                if let Some(partial) = delta.state() {
                    let mut advanced = cur.state().clone();
                    advanced.apply_delta(partial, delta.flags());
                    let advanced = StateRecord::create(delta.tick(), &advanced);
                    self.prev = self.cur.replace(advanced);
                }
            }
        }

        // Lookahead freshness: last tick's `next` never survives.
        self.next = None;
        if let (Some(cur), Some(delta)) = (&self.cur, next_delta) {
            if delta.tick() > cur.tick() {
                if let Some(partial) = delta.state() {
                    let mut ahead = cur.state().clone();
                    ahead.apply_delta(partial, delta.flags());
                    self.next = Some(StateRecord::create(delta.tick(), &ahead));
                }
            }
        }

        self.cur.as_ref().map(StateRecord::state)
    }

    /// Returns the render state for the current frame.
    ///
    /// Interpolates `cur -> next` when a lookahead exists, else extrapolates
    /// along `prev -> cur`; the parameter is deliberately unclamped, so
    /// extrapolation can run past the last confirmed tick. Falls back to the
    /// confirmed state when only one record exists.
    pub fn get_smoothed(&mut self, frame_delta: f32, now: Tick) -> Option<&S> {
        let cur = self.cur.as_ref()?;
        let render_time = now.time_seconds(self.seconds_per_tick) + frame_delta;

        let (from, to) = match (&self.next, &self.prev) {
            (Some(next), _) => (cur, next),
            (None, Some(prev)) => (prev, cur),
            (None, None) => return Some(cur.state()),
        };

        let from_time = from.tick().time_seconds(self.seconds_per_tick);
        let to_time = to.tick().time_seconds(self.seconds_per_tick);
        let span = to_time - from_time;
        if span <= 0.0 {
            return Some(cur.state());
        }
        let t = (render_time - from_time) / span;

        let output = self.output.as_mut()?;
        output.apply_smoothed(from.state(), to.state(), t);
        Some(output)
    }
}
