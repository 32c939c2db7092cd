//! Client-side prediction and command replay for owned entities.

use replica::{HasTick, State, StateDelta, StateRecord, Tick};

use crate::dejitter::DejitterBuffer;

/// Forward-simulation window for a locally controlled entity.
///
/// Each client tick the buffer re-bases on the latest confirmed state plus
/// every buffered server delta, then records one step per replayed command.
/// `prev`/`cur` bracket the last replay step so frame rendering can blend
/// between them.
#[derive(Debug)]
pub struct PredictionBuffer<S> {
    prev: Option<StateRecord<S>>,
    cur: Option<StateRecord<S>>,
    output: Option<S>,
    seconds_per_tick: f32,
}

impl<S: State> PredictionBuffer<S> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new(seconds_per_tick: f32) -> Self {
        Self {
            prev: None,
            cur: None,
            output: None,
            seconds_per_tick,
        }
    }

    /// Tick of the newest prediction step.
    #[must_use]
    pub fn cur_tick(&self) -> Tick {
        self.cur.as_ref().map_or(Tick::INVALID, StateRecord::tick)
    }

    /// Re-bases the prediction on confirmed data; call before replay.
    ///
    /// Clones `confirmed`, applies every buffered delta newer than `now` in
    /// ascending tick order, and anchors the window at the newest buffered
    /// tick (or `now` when nothing newer is buffered). Returns the re-based
    /// state for the entity to simulate from.
    pub fn start(
        &mut self,
        now: Tick,
        confirmed: &S,
        incoming: &DejitterBuffer<StateDelta<S>>,
    ) -> &S {
        let mut latest = confirmed.clone();
        for delta in incoming.get_latest_from(now) {
            if let Some(partial) = delta.state() {
                latest.apply_delta(partial, delta.flags());
            }
        }

        let anchor = incoming.latest().map_or(now, |delta| delta.tick());
        self.prev = None;
        match &mut self.output {
            Some(output) => output.copy_from(&latest),
            None => self.output = Some(latest.clone()),
        }
        self.cur.insert(StateRecord::create(anchor, &latest)).state()
    }

    /// Records one replayed simulation step.
    pub fn update(&mut self, simulated: &S) {
        debug_assert!(self.cur.is_some(), "prediction update before start");
        if let Some(cur) = self.cur.take() {
            let next_tick = cur.tick() + 1;
            self.prev = Some(cur);
            self.cur = Some(StateRecord::create(next_tick, simulated));
        }
    }

    /// Blends the last two prediction steps for frame rendering.
    ///
    /// Interpolates `prev -> cur` at `frame_delta / seconds_per_tick`;
    /// returns the newest step unchanged when only one exists.
    pub fn get_smoothed(&mut self, frame_delta: f32) -> Option<&S> {
        let cur = self.cur.as_ref()?;
        let Some(prev) = &self.prev else {
            return Some(cur.state());
        };

        let t = if self.seconds_per_tick > 0.0 {
            frame_delta / self.seconds_per_tick
        } else {
            0.0
        };
        let output = self.output.as_mut()?;
        output.apply_smoothed(prev.state(), cur.state(), t);
        Some(output)
    }
}
