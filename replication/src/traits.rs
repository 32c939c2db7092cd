//! Collaborator contracts consumed by the replication core.
//!
//! The world loop, input routing, and entity registries live outside this
//! crate; these traits are the seams they plug into.

use replica::State;

/// A registered entity type tag, assigned by the game's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FactoryKind(u32);

impl FactoryKind {
    /// Creates a kind from its registry index.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the registry index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Game-specific simulation callbacks for one entity.
///
/// The replication core drives lifecycle and simulation through this trait;
/// implementations carry whatever game data they need. Every callback has an
/// empty default so simple entities implement only what they use.
pub trait Logic {
    /// The replicated state this entity simulates.
    type State: State;
    /// The input command this entity consumes.
    type Command;

    /// Fires once, the first tick the entity is simulated.
    fn on_start(&mut self, state: &mut Self::State) {
        let _ = state;
    }

    /// Fires when the world removes the entity.
    fn on_shutdown(&mut self, state: &mut Self::State) {
        let _ = state;
    }

    /// Fires on the tick after controller assignment changes.
    fn on_controller_changed(&mut self, state: &mut Self::State, owned: bool) {
        let _ = (state, owned);
    }

    /// Advances the entity by one tick.
    fn on_simulate(&mut self, state: &mut Self::State) {
        let _ = state;
    }

    /// Applies one input command before simulation.
    fn on_simulate_command(&mut self, state: &mut Self::State, command: &Self::Command) {
        let _ = (state, command);
    }

    /// Fires when a remote entity stops receiving updates.
    fn on_frozen(&mut self, state: &Self::State) {
        let _ = state;
    }

    /// Fires when updates resume.
    fn on_unfrozen(&mut self, state: &Self::State) {
        let _ = state;
    }
}

/// A source of input commands for a controlled entity.
///
/// Implemented by the input layer; passed by reference into entity updates.
/// Commands buffered since the last confirmed tick replay in order during
/// prediction.
pub trait Controller {
    /// The command type produced by this controller.
    type Command;

    /// The most recent command, if any.
    fn latest_command(&self) -> Option<&Self::Command>;

    /// Commands not yet confirmed by the server, oldest first.
    fn pending_commands(&self) -> &[Self::Command];
}

/// Produces entity logic instances from registered kinds.
///
/// The registry that maps kinds to concrete types stays outside the core;
/// the core only needs a way to spawn the logic for a kind it was told
/// about.
pub trait Factory {
    /// The logic type this factory produces.
    type Logic: Logic;

    /// Creates uninitialized logic for the given kind.
    fn create(&self, kind: FactoryKind) -> Self::Logic;
}
