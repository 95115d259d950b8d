//! Grid mesh builder: the flat tessellation that the heightmap displaces.
//!
//! # Invariants
//! - Every cell owns its four corners; vertices are never welded across cells.
//! - Positions, texture coordinates and indices stay index-aligned.
//! - Output is a pure function of the grid size.

mod grid;

pub use grid::{GridMesh, MeshSummary, build_grid};

pub fn crate_info() -> &'static str {
    "heightfield-mesh v0.1.0"
}
