use glam::{Vec2, Vec4};

use crate::error::PostFxError;

/// The sub-rectangle of the render target a frame is drawn into, in pixels
/// (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Whether screen coordinates must be remapped into this rectangle
    /// (split or multi-viewport rendering).
    pub adjusted: bool,
}

impl Viewport {
    /// A viewport covering the whole target, without remapping.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            adjusted: false,
        }
    }

    /// `(x, y, width, height)` packed like the `uViewport` uniform.
    #[must_use]
    pub fn as_vec4(&self) -> Vec4 {
        Vec4::new(self.x, self.y, self.width, self.height)
    }

    /// Normalized bounds `(x0, y0, x1, y1)` of the viewport within a target
    /// of `tex_size` pixels.
    #[must_use]
    pub fn bounds(&self, tex_size: Vec2) -> Vec4 {
        Vec4::new(
            self.x / tex_size.x,
            self.y / tex_size.y,
            (self.x + self.width) / tex_size.x,
            (self.y + self.height) / tex_size.y,
        )
    }

    /// Remap a fragment coordinate into the viewport when `adjusted` is set:
    /// `(frag - origin) * (tex_size / viewport_size)`.
    #[inline]
    #[must_use]
    pub fn adjust(&self, frag_coord: Vec2, tex_size: Vec2) -> Vec2 {
        if self.adjusted {
            (frag_coord - Vec2::new(self.x, self.y))
                * (tex_size / Vec2::new(self.width, self.height))
        } else {
            frag_coord
        }
    }

    /// Reject empty or non-finite rectangles.
    pub fn validate(&self) -> Result<(), PostFxError> {
        let finite = self.as_vec4().is_finite();
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(PostFxError::InvalidParameter {
                name: "viewport",
                reason: format!("{:?} is empty or not finite", self.as_vec4()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_viewport_has_unit_bounds() {
        let vp = Viewport::full(640, 480);
        assert_eq!(vp.bounds(Vec2::new(640.0, 480.0)), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn adjusted_viewport_stretches_into_target() {
        let vp = Viewport {
            x: 100.0,
            y: 50.0,
            width: 200.0,
            height: 100.0,
            adjusted: true,
        };
        let tex = Vec2::new(400.0, 200.0);
        assert_eq!(vp.adjust(Vec2::new(100.0, 50.0), tex), Vec2::ZERO);
        assert_eq!(vp.adjust(Vec2::new(300.0, 150.0), tex), tex);
        let plain = Viewport { adjusted: false, ..vp };
        assert_eq!(plain.adjust(Vec2::new(3.0, 4.0), tex), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let vp = Viewport {
            width: 0.0,
            ..Viewport::full(10, 10)
        };
        assert!(vp.validate().is_err());
    }
}
