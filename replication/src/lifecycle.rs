//! One-shot lifecycle latches shared by the server and client entities.

use crate::traits::Logic;

/// Tracks the started/ownership latches of one entity.
///
/// Controller changes latch and fire `on_controller_changed` on the next
/// drive; the very first drive fires it before `on_start` so logic sees its
/// ownership before simulating.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    has_started: bool,
    owned: bool,
    controller_dirty: bool,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_controlled(&self) -> bool {
        self.owned
    }

    #[cfg(test)]
    pub(crate) fn has_started(&self) -> bool {
        self.has_started
    }

    /// Records an ownership change; returns `true` when it actually changed.
    pub(crate) fn set_controlled(&mut self, owned: bool) -> bool {
        if self.owned == owned {
            return false;
        }
        self.owned = owned;
        self.controller_dirty = true;
        true
    }

    /// Fires any due lifecycle callbacks. Idempotent within a tick.
    pub(crate) fn drive<L: Logic>(&mut self, logic: &mut L, state: &mut L::State) {
        if !self.has_started {
            self.has_started = true;
            self.controller_dirty = false;
            logic.on_controller_changed(state, self.owned);
            logic.on_start(state);
        } else if self.controller_dirty {
            self.controller_dirty = false;
            logic.on_controller_changed(state, self.owned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestLogic, TestState};

    #[test]
    fn first_drive_fires_controller_then_start() {
        let mut lifecycle = Lifecycle::new();
        let mut logic = TestLogic::default();
        let mut state = TestState::default();

        lifecycle.drive(&mut logic, &mut state);
        assert_eq!(logic.events, vec!["controller:remote", "start"]);
        assert!(lifecycle.has_started());

        lifecycle.drive(&mut logic, &mut state);
        assert_eq!(logic.events.len(), 2, "drive is one-shot");
    }

    #[test]
    fn controller_change_fires_on_next_drive() {
        let mut lifecycle = Lifecycle::new();
        let mut logic = TestLogic::default();
        let mut state = TestState::default();
        lifecycle.drive(&mut logic, &mut state);

        assert!(lifecycle.set_controlled(true));
        assert!(!lifecycle.set_controlled(true), "no-op change");
        lifecycle.drive(&mut logic, &mut state);
        assert_eq!(
            logic.events,
            vec!["controller:remote", "start", "controller:owned"]
        );
    }
}
