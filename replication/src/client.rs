//! Client-side entity orchestration.

use replica::{EntityId, HasTick, State, StateDelta, Tick};
use tracing::debug;

use crate::config::SyncConfig;
use crate::dejitter::DejitterBuffer;
use crate::lifecycle::Lifecycle;
use crate::prediction::PredictionBuffer;
use crate::smoothing::SmoothingBuffer;
use crate::traits::{Controller, FactoryKind, Logic};

/// The replicated side of one entity on a client peer.
///
/// Incoming frames land in a dejitter buffer; each tick the smoothing
/// buffer advances the confirmed state from it, and owned entities then
/// re-predict forward by replaying pending commands. A remote entity whose
/// updates stall freezes until frames resume.
#[derive(Debug)]
pub struct ClientEntity<L: Logic> {
    id: EntityId,
    kind: FactoryKind,
    state: L::State,
    logic: L,
    incoming: DejitterBuffer<StateDelta<L::State>>,
    smoothing: SmoothingBuffer<L::State>,
    prediction: PredictionBuffer<L::State>,
    last_delta: Tick,
    removed_tick: Tick,
    frozen: bool,
    initialized: bool,
    lifecycle: Lifecycle,
    ticks_before_freeze: u32,
}

impl<L: Logic> ClientEntity<L> {
    /// Creates an entity awaiting its bootstrap frame.
    #[must_use]
    pub fn new(id: EntityId, kind: FactoryKind, logic: L, config: &SyncConfig) -> Self {
        Self {
            id,
            kind,
            state: L::State::default(),
            logic,
            incoming: DejitterBuffer::new(config.dejitter_buffer_length, config.network_send_rate),
            smoothing: SmoothingBuffer::new(config.seconds_per_tick),
            prediction: PredictionBuffer::new(config.seconds_per_tick),
            last_delta: Tick::INVALID,
            removed_tick: Tick::INVALID,
            frozen: false,
            initialized: false,
            lifecycle: Lifecycle::new(),
            ticks_before_freeze: config.ticks_before_freeze,
        }
    }

    /// The entity's session-unique id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The registered entity type.
    #[must_use]
    pub fn kind(&self) -> FactoryKind {
        self.kind
    }

    /// The latest confirmed (or predicted) state.
    #[must_use]
    pub fn state(&self) -> &L::State {
        &self.state
    }

    /// The game logic driving this entity.
    #[must_use]
    pub fn logic(&self) -> &L {
        &self.logic
    }

    /// Tick of the newest frame ever received.
    #[must_use]
    pub fn last_delta(&self) -> Tick {
        self.last_delta
    }

    /// The removal tick signalled by the server; invalid while live.
    #[must_use]
    pub fn removed_tick(&self) -> Tick {
        self.removed_tick
    }

    /// Returns `true` while the entity is starved of updates.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Records whether this peer controls the entity.
    ///
    /// Gaining control unfreezes immediately: owned entities are simulated
    /// locally and never render stale.
    pub fn set_controlled(&mut self, owned: bool) {
        self.lifecycle.set_controlled(owned);
        if owned && self.frozen {
            self.frozen = false;
            self.logic.on_unfrozen(&self.state);
        }
    }

    /// Returns `true` when this peer controls the entity.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.lifecycle.is_controlled()
    }

    /// Accepts one frame from the transport batch.
    ///
    /// Destruction frames record the removal tick. The first update frame
    /// must carry immutable data; until one arrives, frames are dropped.
    /// Stale arrivals are dropped by the dejitter buffer. Every frame,
    /// stored or not, refreshes the update-liveness tick.
    pub fn receive_delta(&mut self, delta: StateDelta<L::State>) {
        let tick = delta.tick();
        if delta.is_destroyed() {
            self.removed_tick = delta.removed_tick();
        } else if !self.initialized && !delta.has_immutable() {
            debug!(
                entity = self.id.raw(),
                tick = tick.raw(),
                "dropping pre-bootstrap frame without immutable data"
            );
        } else {
            self.initialized = true;
            self.incoming.store(delta);
        }

        if tick > self.last_delta {
            self.last_delta = tick;
        }
    }

    /// Advances the entity one client tick.
    ///
    /// Overwrites the state from the smoothing buffer, fires due lifecycle
    /// callbacks, and for owned entities re-bases prediction and replays
    /// every pending command.
    pub fn update(&mut self, tick: Tick, controller: Option<&dyn Controller<Command = L::Command>>) {
        if let Some(confirmed) = self.smoothing.update(tick, &self.incoming) {
            self.state.copy_from(confirmed);
        }
        self.lifecycle.drive(&mut self.logic, &mut self.state);

        if !self.lifecycle.is_controlled() {
            return;
        }
        let Some(controller) = controller else {
            return;
        };

        let rebased = self.prediction.start(tick, &self.state, &self.incoming);
        self.state.copy_from(rebased);
        for command in controller.pending_commands() {
            self.logic.on_simulate_command(&mut self.state, command);
            self.logic.on_simulate(&mut self.state);
            self.prediction.update(&self.state);
        }
    }

    /// Applies the freeze heuristic against the server's actual tick.
    ///
    /// A remote entity freezes when the gap since its last received frame
    /// exceeds the threshold, and unfreezes when frames catch back up; each
    /// edge fires its callback exactly once. Owned entities never freeze.
    /// A zero threshold disables freezing entirely.
    pub fn update_freeze(&mut self, actual_server_tick: Tick) {
        if self.ticks_before_freeze == 0 {
            return;
        }
        if self.lifecycle.is_controlled() {
            if self.frozen {
                self.frozen = false;
                self.logic.on_unfrozen(&self.state);
            }
            return;
        }

        let gap = actual_server_tick - self.last_delta;
        if gap > i64::from(self.ticks_before_freeze) {
            if !self.frozen {
                self.frozen = true;
                debug!(
                    entity = self.id.raw(),
                    gap,
                    "entity frozen, updates stalled"
                );
                self.logic.on_frozen(&self.state);
            }
        } else if self.frozen {
            self.frozen = false;
            debug!(entity = self.id.raw(), "entity unfrozen, updates resumed");
            self.logic.on_unfrozen(&self.state);
        }
    }

    /// Returns the render state for the current frame.
    ///
    /// Owned entities blend their last two prediction steps; remote entities
    /// interpolate or extrapolate from the smoothing window; frozen entities
    /// hold the last confirmed state.
    pub fn get_smoothed(&mut self, frame_delta: f32, now: Tick) -> &L::State {
        if self.frozen {
            return &self.state;
        }
        if self.lifecycle.is_controlled() {
            match self.prediction.get_smoothed(frame_delta) {
                Some(state) => state,
                None => &self.state,
            }
        } else {
            match self.smoothing.get_smoothed(frame_delta, now) {
                Some(state) => state,
                None => &self.state,
            }
        }
    }

    /// Fires the shutdown callback; the world calls this on removal.
    pub fn shutdown(&mut self) {
        self.logic.on_shutdown(&mut self.state);
    }
}
