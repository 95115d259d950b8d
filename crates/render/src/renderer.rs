use crate::view::TerrainView;
use heightfield_mesh::GridMesh;
use std::fmt::Write;

/// Renderer-agnostic interface for drawing a terrain frame.
///
/// A frame is fully described by the mesh, the view and the current height
/// scale. Renderers never modify the mesh.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `mesh` seen through `view`.
    fn render(&self, mesh: &GridMesh, view: &TerrainView, scale: f32) -> Self::Output;
}

/// Produces a human-readable description of a frame.
///
/// Used by the CLI to inspect what the viewer would draw without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, mesh: &GridMesh, view: &TerrainView, scale: f32) -> String {
        let mut out = String::new();
        let model = view.model(mesh.width()).w_axis;
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Terrain Frame (grid={}x{}, scale={:.2}) ===",
            mesh.width(),
            mesh.height(),
            scale
        );
        let _ = writeln!(
            out,
            "Vertices: {}  Indices: {}  Triangles: {}",
            mesh.vertex_count(),
            mesh.index_count(),
            mesh.triangle_count()
        );
        let _ = writeln!(
            out,
            "Model: translate=({:.1}, {:.1}, {:.1})",
            model.x, model.y, model.z
        );
        let _ = writeln!(
            out,
            "Projection: fov={:.0} aspect={:.3} near={} far={}",
            view.fov_degrees, view.aspect, view.near, view.far
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heightfield_mesh::build_grid;

    #[test]
    fn describes_counts_and_scale() {
        let mesh = build_grid(4, 2);
        let output = DebugTextRenderer::new().render(&mesh, &TerrainView::default(), 10.0);

        assert!(output.contains("grid=4x2"));
        assert!(output.contains("scale=10.00"));
        assert!(output.contains("Vertices: 32"));
        assert!(output.contains("Indices: 48"));
        assert!(output.contains("Triangles: 16"));
    }

    #[test]
    fn describes_model_translation() {
        let mesh = build_grid(6, 6);
        let output = DebugTextRenderer::new().render(&mesh, &TerrainView::default(), 1.0);
        assert!(output.contains("translate=(-3.0, -1.0, -10.2)"));
        assert!(output.contains("fov=45"));
    }
}
