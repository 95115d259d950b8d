use crate::action::{Action, HeldActions};

/// Vertical scale applied to heightmap samples in the vertex stage.
///
/// Not clamped: a negative scale mirrors the terrain below the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightScale {
    value: f32,
    initial: f32,
    /// Scale units per second while raise or lower is held.
    rate: f32,
}

impl Default for HeightScale {
    fn default() -> Self {
        Self::new(10.0, 60.0)
    }
}

impl HeightScale {
    pub fn new(initial: f32, rate: f32) -> Self {
        Self {
            value: initial,
            initial,
            rate,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn initial(&self) -> f32 {
        self.initial
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set(&mut self, value: f32) {
        self.value = value;
    }

    /// Advance by `dt` seconds according to the held actions.
    /// Raise and lower held together cancel out.
    pub fn update(&mut self, held: &HeldActions, dt: f32) {
        let mut direction = 0.0;
        if held.is_held(Action::RaiseTerrain) {
            direction += 1.0;
        }
        if held.is_held(Action::LowerTerrain) {
            direction -= 1.0;
        }
        self.value += direction * self.rate * dt;
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
        tracing::debug!("height scale reset to {}", self.initial);
    }
}
