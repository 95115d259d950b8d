//! Viewer input: actions decoupled from any windowing library.
//!
//! # Invariants
//! - The app maps raw keys to `Action`s; everything downstream sees actions only.
//! - Height scale changes are proportional to elapsed time, not frame count.

pub mod action;
mod scale;

pub use action::{Action, HeldActions};
pub use scale::HeightScale;

pub fn crate_info() -> &'static str {
    "heightfield-input v0.1.0"
}
