use std::collections::BTreeSet;

/// A high-level action produced by the viewer's key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Increase the height scale while held.
    RaiseTerrain,
    /// Decrease the height scale while held.
    LowerTerrain,
    /// Restore the initial height scale.
    ResetScale,
    /// Show or hide the stats overlay.
    ToggleOverlay,
    /// Close the viewer.
    Quit,
}

impl Action {
    /// Continuous actions apply every frame while their key is held;
    /// the rest fire once on press.
    pub fn is_continuous(self) -> bool {
        matches!(self, Action::RaiseTerrain | Action::LowerTerrain)
    }
}

/// Set of continuous actions whose keys are currently down.
#[derive(Debug, Clone, Default)]
pub struct HeldActions {
    held: BTreeSet<Action>,
}

impl HeldActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release. Returns `true` when a one-shot action
    /// should fire (first press of a non-continuous action).
    pub fn set(&mut self, action: Action, pressed: bool) -> bool {
        if !pressed {
            self.held.remove(&action);
            return false;
        }
        let newly_pressed = self.held.insert(action);
        newly_pressed && !action.is_continuous()
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Drop every held action, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
