//! wgpu render backend for the terrain viewer.
//!
//! Uploads the grid mesh and heightmap once, then draws the grid with the
//! heightmap displacing each vertex in the vertex stage.
//!
//! # Invariants
//! - The renderer never mutates the mesh or heightmap after upload.
//! - The height scale is a per-frame uniform; changing it never rebuilds buffers.

mod gpu;
mod shaders;
mod texture;

use heightfield_assets::AssetError;

pub use gpu::TerrainRenderer;
pub use shaders::{TERRAIN_SHADER, TEXTURE_GROUP_BASE};
pub use texture::HeightmapTexture;

/// Errors from creating GPU resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("terrain pipeline failed validation: {0}")]
    Shader(String),
    #[error("heightmap {width}x{height} exceeds the device 2D texture limit of {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },
    #[error("texture unit {0} has no bind group slot in the terrain pipeline")]
    UnsupportedTextureUnit(u32),
    #[error("cannot render an empty mesh")]
    EmptyMesh,
    #[error("{width}x{height} grid needs a {buffer} buffer of {bytes} B, device limit is {limit} B")]
    MeshTooLarge {
        width: u32,
        height: u32,
        buffer: &'static str,
        bytes: u64,
        limit: u64,
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
}
