use glam::Vec3;

use crate::{backend::GraphicsBackend, math::frustum::Frustum};

/// The view a frame is submitted for.
pub trait Camera<B: GraphicsBackend> {
    /// Layers whose bit is set are excluded from this camera.
    fn culling_mask(&self) -> u32;

    fn world_position(&self) -> Vec3;

    fn frustum(&self) -> Frustum;

    /// Sets the viewport and binds the camera and view-projection constants.
    fn bind_view(&self, context: &mut B::Context);

    /// Binds the camera's render targets, for backends where targets aren't fixed
    /// when the pass begins.
    fn bind_targets(&self, _context: &mut B::Context) {}

    /// Makes a copy of the current colour target available to shaders that sample
    /// the scene behind them (refraction, distortion).
    fn copy_and_bind_targets(&self, context: &mut B::Context);
}
