//! Depth of field: blends each pixel toward a 5×5 Gaussian blur by its
//! circle of confusion.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::screen_pass::ScreenPass;
use crate::camera::CameraProjection;
use crate::options::{DepthOfFieldOptions, DofMode};
use crate::texture::depth::DepthBuffer;
use crate::texture::ColorBuffer;
use crate::util::screen_space::{
    depth_to_view_z, reconstruct_view_position, smoothstep, BACKGROUND_DEPTH,
};

/// Separable Gaussian weights for the 5×5 blur.
const KERNEL: [f32; 5] = [0.204_164, 0.304_005, 0.393_365, 0.304_005, 0.204_164];

/// Summed tap weight at or below which the blur falls back to the sharp
/// color.
const MIN_BLUR_WEIGHT: f32 = 1e-6;

/// Depth-of-field uniforms - must match WGSL struct
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DofUniforms {
    /// Inverse projection matrix.
    pub inverse_projection: [[f32; 4]; 4],
    /// Focus sphere center in view space.
    pub focus_center: [f32; 3],
    /// 0 planar, 1 spherical.
    pub mode: u32,
    /// Target size in pixels.
    pub tex_size: [f32; 2],
    /// Tap spacing in texels.
    pub blur_spread: f32,
    /// In-focus distance.
    pub in_focus: f32,
    /// CoC falloff distance.
    pub pixels_per_millimeter: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
    /// Non-zero for linear depth decoding.
    pub orthographic: u32,
}

impl DofUniforms {
    /// Derive the uniforms for one frame. Without an explicit focus center
    /// the sphere is centered on the view axis at `in_focus`.
    #[must_use]
    pub fn new(
        options: &DepthOfFieldOptions,
        mode: DofMode,
        camera: &CameraProjection,
        tex_size: Vec2,
        focus_center: Option<Vec3>,
    ) -> Self {
        let center =
            focus_center.unwrap_or(Vec3::new(0.0, 0.0, -options.in_focus));
        Self {
            inverse_projection: camera.inverse_projection().to_cols_array_2d(),
            focus_center: center.to_array(),
            mode: match mode {
                DofMode::Planar => 0,
                DofMode::Spherical => 1,
            },
            tex_size: tex_size.to_array(),
            blur_spread: options.blur_spread,
            in_focus: options.in_focus,
            pixels_per_millimeter: options.pixels_per_millimeter,
            near: camera.near(),
            far: camera.far(),
            orthographic: u32::from(camera.is_orthographic()),
        }
    }
}

/// One frame of the depth-of-field pass.
pub struct DepthOfFieldPass<'a> {
    color: &'a ColorBuffer,
    opaque: &'a DepthBuffer,
    transparent: Option<&'a DepthBuffer>,
    mode: DofMode,
    inverse_projection: Mat4,
    uniforms: DofUniforms,
}

impl<'a> DepthOfFieldPass<'a> {
    /// Bind the pass to this frame's color and depth.
    #[must_use]
    pub fn new(
        mode: DofMode,
        uniforms: DofUniforms,
        color: &'a ColorBuffer,
        opaque: &'a DepthBuffer,
        transparent: Option<&'a DepthBuffer>,
    ) -> Self {
        Self {
            color,
            opaque,
            transparent,
            mode,
            inverse_projection: Mat4::from_cols_array_2d(
                &uniforms.inverse_projection,
            ),
            uniforms,
        }
    }

    fn depth(&self, uv: Vec2) -> f32 {
        let transparent = self
            .transparent
            .map_or(BACKGROUND_DEPTH, |t| t.sample(uv));
        self.opaque.sample(uv).min(transparent)
    }

    /// Signed circle of confusion at `uv`, clamped to `[-1, 1]`.
    #[must_use]
    pub fn circle_of_confusion(&self, uv: Vec2) -> f32 {
        let u = &self.uniforms;
        let depth = self.depth(uv);
        let coc = match self.mode {
            DofMode::Planar => {
                let view_z =
                    depth_to_view_z(depth, u.near, u.far, u.orthographic != 0);
                (view_z.abs() - u.in_focus) / u.pixels_per_millimeter
            }
            DofMode::Spherical => {
                let position =
                    reconstruct_view_position(uv, depth, &self.inverse_projection);
                position.distance(Vec3::from(u.focus_center))
                    / u.pixels_per_millimeter
            }
        };
        coc.clamp(-1.0, 1.0)
    }

    /// CoC-weighted 5×5 blur, or `None` when every tap is in focus.
    fn blurred(&self, uv: Vec2) -> Option<Vec3> {
        let texel = Vec2::ONE / Vec2::from(self.uniforms.tex_size);
        let mut sum = Vec3::ZERO;
        let mut weight = 0.0;
        for (x, kx) in KERNEL.iter().enumerate() {
            for (y, ky) in KERNEL.iter().enumerate() {
                let offset = Vec2::new(x as f32 - 2.0, y as f32 - 2.0)
                    * texel
                    * self.uniforms.blur_spread;
                let tap = uv + offset;
                let w = kx * ky
                    * smoothstep(0.0, 1.0, self.circle_of_confusion(tap).abs());
                sum += self.color.sample_linear(tap).truncate() * w;
                weight += w;
            }
        }
        (weight > MIN_BLUR_WEIGHT).then(|| sum / weight)
    }
}

impl ScreenPass for DepthOfFieldPass<'_> {
    type Texel = Vec4;

    fn label(&self) -> &'static str {
        "depth_of_field"
    }

    fn shade(&self, frag_coord: Vec2) -> Vec4 {
        let uv = frag_coord / Vec2::from(self.uniforms.tex_size);
        let sharp = self.color.sample_nearest(uv);
        let Some(blurred) = self.blurred(uv) else {
            return sharp;
        };
        let t = smoothstep(0.0, 1.0, self.circle_of_confusion(uv).abs());
        sharp.truncate().lerp(blurred, t).extend(sharp.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::depth::DepthEncoding;
    use crate::texture::TextureBuffer;
    use crate::util::screen_space::view_z_to_depth;

    const SIZE: u32 = 16;
    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    fn camera() -> CameraProjection {
        CameraProjection::perspective(1.0, 1.0, NEAR, FAR).unwrap()
    }

    fn checkerboard() -> ColorBuffer {
        TextureBuffer::from_fn(SIZE, SIZE, |x, y| {
            if (x + y) % 2 == 0 {
                Vec4::new(1.0, 1.0, 1.0, 0.5)
            } else {
                Vec4::new(0.0, 0.0, 0.0, 0.5)
            }
        })
    }

    fn flat_depth(view_z: f32, encoding: DepthEncoding) -> DepthBuffer {
        let d = view_z_to_depth(view_z, NEAR, FAR, false);
        DepthBuffer::encode(&TextureBuffer::new(SIZE, SIZE, d), encoding)
    }

    fn options() -> DepthOfFieldOptions {
        DepthOfFieldOptions {
            enabled: true,
            in_focus: 10.0,
            pixels_per_millimeter: 2.0,
            ..Default::default()
        }
    }

    fn render(pass: &DepthOfFieldPass<'_>) -> ColorBuffer {
        let mut out = TextureBuffer::new(SIZE, SIZE, Vec4::ZERO);
        pass.render(&mut out);
        out
    }

    #[test]
    fn in_focus_plane_stays_sharp() {
        let color = checkerboard();
        let depth = flat_depth(-10.0, DepthEncoding::Native);
        let u = DofUniforms::new(
            &options(),
            DofMode::Planar,
            &camera(),
            Vec2::splat(SIZE as f32),
            None,
        );
        let pass = DepthOfFieldPass::new(DofMode::Planar, u, &color, &depth, None);
        let out = render(&pass);
        for (a, b) in out.texels().iter().zip(color.texels()) {
            assert!((*a - *b).abs().max_element() < 1e-4);
        }
    }

    #[test]
    fn far_background_is_blurred() {
        let color = checkerboard();
        let depth = DepthBuffer::cleared(SIZE, SIZE, DepthEncoding::Native);
        let u = DofUniforms::new(
            &options(),
            DofMode::Planar,
            &camera(),
            Vec2::splat(SIZE as f32),
            None,
        );
        let pass = DepthOfFieldPass::new(DofMode::Planar, u, &color, &depth, None);
        assert_eq!(pass.circle_of_confusion(Vec2::splat(0.5)), 1.0);
        let c = pass.shade(Vec2::splat(8.5));
        // Averaging the checkerboard pulls white toward grey.
        assert!(c.x > 0.2 && c.x < 0.8, "{c:?}");
        assert_eq!(c.w, 0.5);
    }

    #[test]
    fn nearer_transparent_depth_wins() {
        let color = checkerboard();
        let opaque = DepthBuffer::cleared(SIZE, SIZE, DepthEncoding::Native);
        let transparent = flat_depth(-10.0, DepthEncoding::Packed);
        let u = DofUniforms::new(
            &options(),
            DofMode::Planar,
            &camera(),
            Vec2::splat(SIZE as f32),
            None,
        );
        let pass = DepthOfFieldPass::new(
            DofMode::Planar,
            u,
            &color,
            &opaque,
            Some(&transparent),
        );
        assert!(pass.circle_of_confusion(Vec2::splat(0.5)).abs() < 1e-3);
    }

    #[test]
    fn spherical_focus_on_center() {
        let color = checkerboard();
        let depth = flat_depth(-10.0, DepthEncoding::Native);
        let uv = Vec2::splat(8.5 / SIZE as f32);
        let d = depth.sample(uv);
        let center =
            reconstruct_view_position(uv, d, &camera().inverse_projection());
        let u = DofUniforms::new(
            &options(),
            DofMode::Spherical,
            &camera(),
            Vec2::splat(SIZE as f32),
            Some(center),
        );
        let pass =
            DepthOfFieldPass::new(DofMode::Spherical, u, &color, &depth, None);
        assert!(pass.circle_of_confusion(uv) < 1e-4);
        // Spherical CoC is a distance, so it is never negative.
        assert!(pass.circle_of_confusion(Vec2::ZERO) >= 0.0);
    }

    #[test]
    fn coc_is_clamped() {
        let color = checkerboard();
        let depth = flat_depth(-0.2, DepthEncoding::Native);
        let opts = DepthOfFieldOptions {
            in_focus: 90.0,
            pixels_per_millimeter: 0.5,
            ..options()
        };
        let u = DofUniforms::new(
            &opts,
            DofMode::Planar,
            &camera(),
            Vec2::splat(SIZE as f32),
            None,
        );
        let pass = DepthOfFieldPass::new(DofMode::Planar, u, &color, &depth, None);
        assert_eq!(pass.circle_of_confusion(Vec2::splat(0.5)), -1.0);
    }

    #[test]
    fn uniforms_are_sixteen_byte_aligned() {
        assert_eq!(size_of::<DofUniforms>() % 16, 0);
    }
}
