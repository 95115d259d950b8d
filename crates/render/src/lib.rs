//! Rendering Adapter: renderer-agnostic view of the terrain.
//!
//! # Invariants
//! - Renderers read the mesh; they never modify it.
//! - Model, view and projection derive only from the grid width and the view settings.
//!
//! The wgpu backend lives in `heightfield-render-wgpu`. This crate holds the
//! transforms both backends share and a text renderer for headless use.

mod renderer;
mod view;

pub use renderer::{DebugTextRenderer, Renderer};
pub use view::TerrainView;

pub fn crate_info() -> &'static str {
    "heightfield-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
