use glam::Vec2;

use crate::texture::TextureBuffer;

/// Uniform interface for fullscreen post-processing passes.
///
/// A pass is a pure function of the fragment coordinate over read-only
/// inputs it borrows for one frame. Inputs and the output target are
/// distinct buffers, so no pass ever reads what it is writing.
pub trait ScreenPass: Sync {
    /// Output texel type.
    type Texel: Copy + Send + Sync;

    /// Short name used in logs and timings.
    fn label(&self) -> &'static str;

    /// Shade the pixel whose center is at `frag_coord` (pixels, origin
    /// bottom-left).
    fn shade(&self, frag_coord: Vec2) -> Self::Texel;

    /// Shade every pixel of `target` in parallel.
    fn render(&self, target: &mut TextureBuffer<Self::Texel>) {
        log::trace!(
            "{}: {}x{}",
            self.label(),
            target.width(),
            target.height()
        );
        target.shade_parallel(|frag_coord| self.shade(frag_coord));
    }
}
