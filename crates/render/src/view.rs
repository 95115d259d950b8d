use glam::{Mat4, Vec3};

/// Fixed camera looking down -Z at a terrain grid placed in front of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainView {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for TerrainView {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 1280.0 / 720.0,
            near: 0.1,
            far: 1500.0,
        }
    }
}

impl TerrainView {
    /// Update the aspect ratio from a surface size in pixels.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Places a grid `grid_width` cells wide centered in X, below eye level
    /// and pushed back along -Z so the whole grid is in frame.
    pub fn model(&self, grid_width: u32) -> Mat4 {
        let w = grid_width as f32;
        Mat4::from_translation(Vec3::new(-w / 2.0, -w / 6.0, -w * 1.7))
    }

    pub fn view(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Combined clip-from-model transform.
    pub fn model_view_projection(&self, grid_width: u32) -> Mat4 {
        self.projection() * self.view() * self.model(grid_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn to_ndc(clip: Vec4) -> Vec3 {
        clip.truncate() / clip.w
    }

    #[test]
    fn default_view() {
        let view = TerrainView::default();
        assert_eq!(view.fov_degrees, 45.0);
        assert_eq!(view.near, 0.1);
        assert_eq!(view.far, 1500.0);
    }

    #[test]
    fn set_viewport_guards_zero_height() {
        let mut view = TerrainView::default();
        view.set_viewport(800, 0);
        assert_eq!(view.aspect, 800.0);
        view.set_viewport(1920, 1080);
        assert!((view.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn model_translation_scales_with_width() {
        let view = TerrainView::default();
        let t = view.model(60).w_axis;
        assert_eq!(t.truncate(), Vec3::new(-30.0, -10.0, -102.0));
    }

    #[test]
    fn grid_center_is_in_frame() {
        let view = TerrainView::default();
        let w = 256u32;
        let center = Vec4::new(w as f32 / 2.0, 0.0, w as f32 / 2.0, 1.0);
        let ndc = to_ndc(view.model_view_projection(w) * center);
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y > -1.0 && ndc.y < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn view_is_identity() {
        assert_eq!(TerrainView::default().view(), Mat4::IDENTITY);
    }
}
