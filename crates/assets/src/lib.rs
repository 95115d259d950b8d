//! Resource loading for the terrain viewer.
//!
//! Decodes heightmap images, reads shader sources from disk and hands out
//! texture units. The renderer consumes the decoded data, never file paths.
//!
//! # Invariants
//! - A loaded `Heightmap` has non-zero dimensions and tightly packed RGBA8 rows.
//! - Texture units are owned by an explicit allocator; there is no global count.

mod heightmap;
mod shader;
mod texture_unit;

use heightfield_common::GridError;
use std::path::PathBuf;

pub use heightmap::{AddressMode, Heightmap, load_heightmap};
pub use shader::load_shader_source;
pub use texture_unit::{TextureUnit, TextureUnitAllocator};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image has zero dimensions ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("heightmap cannot be used as a grid: {0}")]
    Grid(#[from] GridError),
    #[error("shader source {0} is empty")]
    EmptyShader(PathBuf),
    #[error("all {capacity} texture units are in use")]
    TextureUnitsExhausted { capacity: u32 },
    #[error("unknown address mode {0:?}, expected clamp or mirror-repeat")]
    UnknownAddressMode(String),
}

pub fn crate_info() -> &'static str {
    "heightfield-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }

    #[test]
    fn errors_name_the_path() {
        let err = AssetError::EmptyShader(PathBuf::from("res/shaders/terrain.wgsl"));
        assert!(err.to_string().contains("terrain.wgsl"));
    }
}
