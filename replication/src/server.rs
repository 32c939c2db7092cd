//! Server-side entity orchestration.

use replica::{EntityId, State, StateDelta, StateRecord, Tick};
use tracing::debug;

use crate::config::SyncConfig;
use crate::lifecycle::Lifecycle;
use crate::queue::RecordQueue;
use crate::traits::{Controller, FactoryKind, Logic};

/// Which peer a produced frame is destined for.
///
/// Private fields travel only to the entity's controlling peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The controlling peer; sees private fields.
    Owner,
    /// Any other peer; private fields are masked out.
    Proxy,
}

/// The authoritative side of one replicated entity.
///
/// Holds the live state, the game logic, and the outgoing record history
/// that deltas are encoded against. Driven once per tick by the world loop:
/// [`update`](Self::update), then [`store_record`](Self::store_record), and
/// [`produce_delta`](Self::produce_delta) at send time with any basis tick
/// at or before the current one.
#[derive(Debug)]
pub struct ServerEntity<L: Logic> {
    id: EntityId,
    kind: FactoryKind,
    state: L::State,
    logic: L,
    outgoing: RecordQueue<StateRecord<L::State>>,
    removed_tick: Tick,
    lifecycle: Lifecycle,
    force_updates: bool,
}

impl<L: Logic> ServerEntity<L> {
    /// Creates an entity with a zero state.
    #[must_use]
    pub fn new(id: EntityId, kind: FactoryKind, logic: L, config: &SyncConfig) -> Self {
        Self {
            id,
            kind,
            state: L::State::default(),
            logic,
            outgoing: RecordQueue::new(config.dejitter_buffer_length),
            removed_tick: Tick::INVALID,
            lifecycle: Lifecycle::new(),
            force_updates: config.force_updates,
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

    /// The live authoritative state.
    #[must_use]
    pub fn state(&self) -> &L::State {
        &self.state
    }

    /// Mutable access to the live state for game systems.
    pub fn state_mut(&mut self) -> &mut L::State {
        &mut self.state
    }

    /// The game logic driving this entity.
    #[must_use]
    pub fn logic(&self) -> &L {
        &self.logic
    }

    /// Overrides the per-entity force-updates setting.
    pub fn set_force_updates(&mut self, force_updates: bool) {
        self.force_updates = force_updates;
    }

    /// Records whether a peer controls this entity.
    pub fn set_controlled(&mut self, owned: bool) {
        self.lifecycle.set_controlled(owned);
    }

    /// Returns `true` when a peer controls this entity.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.lifecycle.is_controlled()
    }

    /// The scheduled removal tick; invalid while the entity is live.
    #[must_use]
    pub fn removed_tick(&self) -> Tick {
        self.removed_tick
    }

    /// Advances the entity one tick: lifecycle, latest command, simulation.
    pub fn update(&mut self, controller: Option<&dyn Controller<Command = L::Command>>) {
        self.lifecycle.drive(&mut self.logic, &mut self.state);
        if let Some(controller) = controller {
            if let Some(command) = controller.latest_command() {
                self.logic.on_simulate_command(&mut self.state, command);
            }
        }
        self.logic.on_simulate(&mut self.state);
    }

    /// Appends the current state to the outgoing history.
    ///
    /// Suppressed when the state equals the previous record under encoder
    /// equivalence; unchanged entities add nothing to history.
    pub fn store_record(&mut self, tick: Tick) {
        if let Some(record) = StateRecord::create_next(tick, &self.state, self.outgoing.latest()) {
            self.outgoing.store(record);
        }
    }

    /// Builds the frame for one destination, or `None` to skip it.
    ///
    /// An invalid basis tick requests a full snapshot. A valid basis tick
    /// whose record has been evicted from the outgoing history promotes to a
    /// full snapshot as well. A frame that carries nothing — empty mask, no
    /// immutable data, no destruction — is skipped unless force-updates is
    /// on.
    #[must_use]
    pub fn produce_delta(
        &self,
        tick: Tick,
        basis_tick: Tick,
        scope: Scope,
    ) -> Option<StateDelta<L::State>> {
        if self.removed_tick.is_valid() {
            return Some(StateDelta::destruction(self.id, tick, self.removed_tick));
        }

        let basis = if basis_tick.is_valid() {
            let record = self.outgoing.latest_at(basis_tick);
            if record.is_none() {
                debug!(
                    entity = self.id.raw(),
                    basis = basis_tick.raw(),
                    "basis evicted from history, promoting to full snapshot"
                );
            }
            record
        } else {
            None
        };

        let has_immutable = basis.is_none();
        let mut flags = match basis {
            Some(record) => self.state.dirty_flags(record.state()),
            None => L::State::all_flags(),
        };
        if scope == Scope::Proxy {
            flags = flags.without(L::State::PRIVATE_FLAGS);
        }

        if flags.is_empty() && !has_immutable && !self.force_updates {
            return None;
        }
        Some(StateDelta::update(
            self.id,
            tick,
            self.state.clone(),
            flags,
            has_immutable,
        ))
    }

    /// Schedules removal on the next tick, avoiding in-flight mutation.
    pub fn mark_for_remove(&mut self, tick: Tick) {
        self.removed_tick = tick + 1;
    }

    /// Fires the shutdown callback; the world calls this on removal.
    pub fn shutdown(&mut self) {
        self.logic.on_shutdown(&mut self.state);
    }
}
