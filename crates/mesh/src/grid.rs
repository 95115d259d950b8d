use heightfield_common::GridSize;
use serde::Serialize;

/// Flat grid tessellation of the XZ plane, one unit quad per cell.
///
/// Laid out as three parallel buffers ready for upload: `positions` holds
/// three floats per vertex, `texcoords` two floats per vertex, and `indices`
/// a triangle list referencing the emitted vertices in order.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    width: u32,
    height: u32,
    positions: Vec<f32>,
    indices: Vec<u32>,
    texcoords: Vec<f32>,
}

/// Serializable statistics about a built mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshSummary {
    pub width: u32,
    pub height: u32,
    pub vertex_count: usize,
    pub index_count: usize,
    pub triangle_count: usize,
    pub position_bytes: usize,
    pub index_bytes: usize,
    pub texcoord_bytes: usize,
}

/// Build the grid mesh for a `width` x `height` cell grid.
///
/// Cells are visited with the outer loop over `i in 0..width` and the inner
/// loop over `j in 0..height`. Cell `(i, j)` appends its corners in the order
/// `(i, j)`, `(i+1, j)`, `(i+1, j+1)`, `(i, j+1)`, stored as points
/// `(x, 0, z)`, with texture coordinates `(x / width, z / height)`. Its two
/// triangles are `(b, b+1, b+2)` and `(b+2, b+3, b)` where `b` is the index of
/// its first corner.
///
/// A zero dimension produces an empty mesh. Use [`GridMesh::from_size`] for a
/// validated size.
pub fn build_grid(width: u32, height: u32) -> GridMesh {
    let cells = width as usize * height as usize;
    let mut positions = Vec::with_capacity(cells * 12);
    let mut indices = Vec::with_capacity(cells * 6);
    let mut texcoords = Vec::with_capacity(cells * 8);

    let w = width as f32;
    let h = height as f32;
    let mut base = 0u32;

    for i in 0..width {
        for j in 0..height {
            let x0 = i as f32;
            let x1 = (i + 1) as f32;
            let z0 = j as f32;
            let z1 = (j + 1) as f32;

            #[rustfmt::skip]
            positions.extend_from_slice(&[
                x0, 0.0, z0,
                x1, 0.0, z0,
                x1, 0.0, z1,
                x0, 0.0, z1,
            ]);

            #[rustfmt::skip]
            indices.extend_from_slice(&[
                base, base + 1, base + 2,
                base + 2, base + 3, base,
            ]);
            base += 4;

            #[rustfmt::skip]
            texcoords.extend_from_slice(&[
                x0 / w, z0 / h,
                x1 / w, z0 / h,
                x1 / w, z1 / h,
                x0 / w, z1 / h,
            ]);
        }
    }

    tracing::debug!(
        width,
        height,
        vertices = positions.len() / 3,
        indices = indices.len(),
        "built grid mesh"
    );

    GridMesh {
        width,
        height,
        positions,
        indices,
        texcoords,
    }
}

impl GridMesh {
    /// Build the mesh for a validated grid size.
    pub fn from_size(size: GridSize) -> Self {
        build_grid(size.width(), size.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Vertex positions, `[x, y, z]` per vertex.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Triangle-list indices into the vertex arrays.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Texture coordinates, `[u, v]` per vertex.
    pub fn texcoords(&self) -> &[f32] {
        &self.texcoords
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Consume the mesh, returning `(positions, indices, texcoords)`.
    pub fn into_parts(self) -> (Vec<f32>, Vec<u32>, Vec<f32>) {
        (self.positions, self.indices, self.texcoords)
    }

    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            width: self.width,
            height: self.height,
            vertex_count: self.vertex_count(),
            index_count: self.index_count(),
            triangle_count: self.triangle_count(),
            position_bytes: std::mem::size_of_val(self.positions.as_slice()),
            index_bytes: std::mem::size_of_val(self.indices.as_slice()),
            texcoord_bytes: std::mem::size_of_val(self.texcoords.as_slice()),
        }
    }
}
