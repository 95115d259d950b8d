//! Shared types for the heightfield workspace.
//!
//! # Invariants
//! - A `GridSize` never has a zero dimension.
//! - A `GridSize` always addresses its vertices with `u32` indices.

mod grid_size;

pub use grid_size::{GridError, GridSize};

pub fn crate_info() -> &'static str {
    "heightfield-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
