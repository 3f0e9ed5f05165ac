//! Screen-space shadows: ray-march the depth buffer toward each light.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::screen_pass::ScreenPass;
use super::variants::{sampling_index, ShadowVariant};
use crate::camera::{CameraProjection, Viewport};
use crate::lighting::{LightSet, MAX_SHADOW_LIGHTS};
use crate::options::{SamplingPattern, ShadowOptions};
use crate::texture::depth::DepthBuffer;
use crate::util::color::hash_random;
use crate::util::screen_space::{
    depth_to_view_z, is_background_depth, project_to_screen,
    reconstruct_view_position,
};

/// Golden angle in radians, spacing successive Poisson-disk offsets.
const GOLDEN_ANGLE: f32 = 2.399_963_2;
/// Lateral radius of the Poisson-disk spiral, in step lengths.
const POISSON_RADIUS: f32 = 9.86 * 0.2;
/// Amplitude of the jittered offsets, in step lengths.
const JITTER_SCALE: f32 = 0.3;

/// Shadow uniforms - must match WGSL struct
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniforms {
    /// Projection matrix.
    pub projection: [[f32; 4]; 4],
    /// Inverse projection matrix.
    pub inverse_projection: [[f32; 4]; 4],
    /// Normalized viewport bounds `(x0, y0, x1, y1)`.
    pub bounds: [f32; 4],
    /// Target size in pixels.
    pub tex_size: [f32; 2],
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
    /// March length in view space.
    pub max_distance: f32,
    /// Occlusion depth tolerance.
    pub tolerance: f32,
    /// Shadow strength.
    pub bias: f32,
    /// Number of valid entries in the light arrays.
    pub light_count: u32,
    /// Steps per light.
    pub steps: u32,
    /// 0 uniform, 1 Poisson disk, 2 jittered.
    pub sampling_pattern: u32,
    /// Non-zero for linear depth decoding.
    pub orthographic: u32,
    /// Padding for GPU alignment.
    pub _pad: u32,
    /// View-space light directions (xyz, w unused).
    pub light_direction: [[f32; 4]; MAX_SHADOW_LIGHTS],
    /// Light colors (rgb, w unused).
    pub light_color: [[f32; 4]; MAX_SHADOW_LIGHTS],
}

impl ShadowUniforms {
    /// Derive the uniforms for one frame.
    #[must_use]
    pub fn new(
        options: &ShadowOptions,
        variant: ShadowVariant,
        camera: &CameraProjection,
        viewport: &Viewport,
        tex_size: Vec2,
        lights: &LightSet,
    ) -> Self {
        let mut uniforms = Self {
            projection: camera.projection().to_cols_array_2d(),
            inverse_projection: camera.inverse_projection().to_cols_array_2d(),
            bounds: viewport.bounds(tex_size).to_array(),
            tex_size: tex_size.to_array(),
            near: camera.near(),
            far: camera.far(),
            max_distance: options.max_distance,
            tolerance: options.tolerance,
            bias: options.bias,
            light_count: 0,
            steps: variant.steps,
            sampling_pattern: sampling_index(variant.pattern),
            orthographic: u32::from(camera.is_orthographic()),
            _pad: 0,
            light_direction: [[0.0; 4]; MAX_SHADOW_LIGHTS],
            light_color: [[0.0; 4]; MAX_SHADOW_LIGHTS],
        };
        uniforms.set_lights(lights);
        uniforms
    }

    /// Replace the light arrays; unused slots are zeroed.
    pub fn set_lights(&mut self, lights: &LightSet) {
        self.light_direction = [[0.0; 4]; MAX_SHADOW_LIGHTS];
        self.light_color = [[0.0; 4]; MAX_SHADOW_LIGHTS];
        for ((dir, color), light) in self
            .light_direction
            .iter_mut()
            .zip(self.light_color.iter_mut())
            .zip(lights.as_slice())
        {
            *dir = light.direction.extend(0.0).to_array();
            *color = light.color.extend(0.0).to_array();
        }
        self.light_count = lights.len() as u32;
    }
}

/// One frame of the shadow pass. Output is a per-pixel light factor in
/// `[1 - bias, 1]`, or 0 for background pixels.
pub struct ShadowPass<'a> {
    depth: &'a DepthBuffer,
    pattern: SamplingPattern,
    projection: Mat4,
    inverse_projection: Mat4,
    bounds: Vec4,
    uniforms: ShadowUniforms,
}

impl<'a> ShadowPass<'a> {
    /// Bind the pass to this frame's opaque depth.
    #[must_use]
    pub fn new(
        variant: ShadowVariant,
        uniforms: ShadowUniforms,
        depth: &'a DepthBuffer,
    ) -> Self {
        Self {
            depth,
            pattern: variant.pattern,
            projection: Mat4::from_cols_array_2d(&uniforms.projection),
            inverse_projection: Mat4::from_cols_array_2d(
                &uniforms.inverse_projection,
            ),
            bounds: Vec4::from(uniforms.bounds),
            uniforms,
        }
    }

    fn outside_bounds(&self, p: Vec2) -> bool {
        let b = self.bounds;
        p.x < b.x || p.y < b.y || p.x > b.z || p.y > b.w
    }

    fn screen_fade(&self, coords: Vec2) -> f32 {
        let b = self.bounds;
        let c = (coords - Vec2::new(b.x, b.y)) / Vec2::new(b.z - b.x, b.w - b.y);
        let fade = ((c - Vec2::splat(0.5)).abs() * 12.0 - Vec2::splat(5.0))
            .max(Vec2::ZERO);
        (1.0 - fade.dot(fade)).clamp(0.0, 1.0)
    }

    fn ray_step(&self, direction: Vec3, step_length: f32, index: u32) -> Vec3 {
        let base = direction * step_length;
        let i = index as f32;
        match self.pattern {
            SamplingPattern::Uniform => base,
            SamplingPattern::PoissonDisk => {
                let angle = i * GOLDEN_ANGLE;
                let radius = (i / self.uniforms.steps as f32).sqrt();
                let offset = Vec2::new(angle.cos(), angle.sin())
                    * radius
                    * step_length
                    * POISSON_RADIUS;
                base + offset.extend(0.0)
            }
            SamplingPattern::Jittered => {
                let jitter = Vec3::new(
                    hash_random(Vec2::new(i, 0.0)),
                    hash_random(Vec2::new(i, 1.0)),
                    0.0,
                ) - Vec3::splat(0.5);
                base + jitter * step_length * JITTER_SCALE
            }
        }
    }

    /// Light factor for one light: `1 - bias * occlusion`, or 1 when the
    /// ray leaves the viewport before hitting anything.
    #[must_use]
    pub fn light_visibility(&self, position: Vec3, light_direction: Vec3) -> f32 {
        let u = &self.uniforms;
        let step_length = u.max_distance / u.steps as f32;
        let direction = -light_direction;
        let mut ray = position;
        let mut occlusion = 0.0;
        for i in 0..u.steps {
            ray += self.ray_step(direction, step_length, i);
            let coords = project_to_screen(ray, &self.projection).truncate();
            if self.outside_bounds(coords) {
                return 1.0;
            }
            let scene_z = depth_to_view_z(
                self.depth.sample(coords),
                u.near,
                u.far,
                u.orthographic != 0,
            );
            if ray.z - scene_z < u.tolerance {
                occlusion = self.screen_fade(coords);
                break;
            }
        }
        1.0 - u.bias * occlusion
    }
}

impl ScreenPass for ShadowPass<'_> {
    type Texel = f32;

    fn label(&self) -> &'static str {
        "shadows"
    }

    fn shade(&self, frag_coord: Vec2) -> f32 {
        let u = &self.uniforms;
        let uv = frag_coord / Vec2::from(u.tex_size);
        let depth = self.depth.sample(uv);
        if is_background_depth(depth) {
            return 0.0;
        }
        let position = reconstruct_view_position(uv, depth, &self.inverse_projection);
        u.light_direction
            .iter()
            .take(u.light_count as usize)
            .fold(1.0_f32, |o, dir| {
                o.min(self.light_visibility(position, Vec4::from(*dir).truncate()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::LightDescriptor;
    use crate::texture::depth::DepthEncoding;
    use crate::texture::TextureBuffer;
    use crate::util::screen_space::view_z_to_depth;

    const SIZE: u32 = 32;
    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    fn camera() -> CameraProjection {
        CameraProjection::perspective(1.0, 1.0, NEAR, FAR).unwrap()
    }

    /// Occluder plane at z = -5 with a raised square at z = -2 in the
    /// middle of the screen.
    fn scene_depth() -> DepthBuffer {
        let plane = view_z_to_depth(-5.0, NEAR, FAR, false);
        let raised = view_z_to_depth(-2.0, NEAR, FAR, false);
        let depths = TextureBuffer::from_fn(SIZE, SIZE, |x, y| {
            if (14..18).contains(&x) && (14..18).contains(&y) {
                raised
            } else {
                plane
            }
        });
        DepthBuffer::encode(&depths, DepthEncoding::Native)
    }

    fn pass_with<'a>(
        depth: &'a DepthBuffer,
        options: &ShadowOptions,
        lights: &LightSet,
    ) -> ShadowPass<'a> {
        let variant = ShadowVariant {
            pattern: options.sampling_pattern,
            steps: options.steps,
        };
        let u = ShadowUniforms::new(
            options,
            variant,
            &camera(),
            &Viewport::full(SIZE, SIZE),
            Vec2::splat(SIZE as f32),
            lights,
        );
        ShadowPass::new(variant, u, depth)
    }

    fn options() -> ShadowOptions {
        ShadowOptions {
            enabled: true,
            max_distance: 4.0,
            steps: 16,
            tolerance: 0.01,
            ..Default::default()
        }
    }

    fn marching_away_from_camera() -> LightSet {
        // The ray runs against the light direction, i.e. along -Z.
        LightSet::from_slice(&[LightDescriptor::new(Vec3::Z, Vec3::ONE)])
            .unwrap()
    }

    #[test]
    fn marching_into_the_surface_is_shadowed() {
        let depth = scene_depth();
        let lights = marching_away_from_camera();
        let pass = pass_with(&depth, &options(), &lights);
        let out = pass.shade(Vec2::splat(16.5));
        assert!(out < 1.0, "{out}");
    }

    #[test]
    fn raised_square_shades_the_plane_beside_it() {
        let depth = scene_depth();
        // March toward the camera and across the square: +X and +Z.
        let lights = LightSet::from_slice(&[LightDescriptor::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::ONE,
        )])
        .unwrap();
        let opts = ShadowOptions {
            max_distance: 4.0,
            ..options()
        };
        let pass = pass_with(&depth, &opts, &lights);

        // Plane texel two columns left of the square: the first step is
        // still in front of the plane, later steps pass behind the square.
        let beside = Vec2::new(12.5, 16.5);
        let plane = view_z_to_depth(-5.0, NEAR, FAR, false);
        assert_eq!(depth.sample(beside / SIZE as f32), plane);
        let shaded = pass.shade(beside);
        assert!((shaded - (1.0 - opts.bias)).abs() < 1e-5, "{shaded}");

        // Same plane, rows below the square: nothing in the way.
        assert_eq!(pass.shade(Vec2::new(12.5, 4.5)), 1.0);
    }

    #[test]
    fn every_sampling_pattern_finds_the_occluder() {
        let depth = scene_depth();
        let lights = marching_away_from_camera();
        for pattern in [
            SamplingPattern::Uniform,
            SamplingPattern::PoissonDisk,
            SamplingPattern::Jittered,
        ] {
            let opts = ShadowOptions {
                sampling_pattern: pattern,
                ..options()
            };
            let pass = pass_with(&depth, &opts, &lights);
            assert!(pass.shade(Vec2::splat(16.5)) < 1.0, "{pattern:?}");
        }
    }

    #[test]
    fn background_is_zero() {
        let depth = DepthBuffer::cleared(SIZE, SIZE, DepthEncoding::Native);
        let lights = marching_away_from_camera();
        let pass = pass_with(&depth, &options(), &lights);
        let mut out = TextureBuffer::new(SIZE, SIZE, 1.0);
        pass.render(&mut out);
        assert!(out.texels().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn no_lights_means_fully_lit() {
        let depth = scene_depth();
        let pass = pass_with(&depth, &options(), &LightSet::new());
        assert_eq!(pass.shade(Vec2::splat(16.5)), 1.0);
    }

    #[test]
    fn ray_leaving_viewport_is_lit() {
        let depth = scene_depth();
        let lights = LightSet::from_slice(&[LightDescriptor::new(
            Vec3::NEG_X,
            Vec3::ONE,
        )])
        .unwrap();
        let opts = ShadowOptions {
            max_distance: 100.0,
            ..options()
        };
        let pass = pass_with(&depth, &opts, &lights);
        // A ray running sideways across the near face exits the screen.
        let position = Vec3::new(0.0, 0.0, -0.5);
        assert_eq!(pass.light_visibility(position, Vec3::NEG_X), 1.0);
    }

    #[test]
    fn stronger_bias_never_brightens() {
        let depth = scene_depth();
        let lights = marching_away_from_camera();
        let mut previous = f32::INFINITY;
        for bias in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let opts = ShadowOptions { bias, ..options() };
            let v = pass_with(&depth, &opts, &lights).shade(Vec2::splat(16.5));
            assert!(v <= previous, "bias {bias}: {v} > {previous}");
            previous = v;
        }
    }

    #[test]
    fn darkest_light_wins() {
        let depth = scene_depth();
        let lights = LightSet::from_slice(&[
            LightDescriptor::new(Vec3::NEG_Z, Vec3::ONE),
            LightDescriptor::new(Vec3::Z, Vec3::ONE),
        ])
        .unwrap();
        let pass = pass_with(&depth, &options(), &lights);
        let single = pass_with(&depth, &options(), &marching_away_from_camera());
        let frag = Vec2::splat(16.5);
        assert_eq!(pass.shade(frag), single.shade(frag));
    }

    #[test]
    fn uniforms_are_sixteen_byte_aligned() {
        assert_eq!(size_of::<ShadowUniforms>() % 16, 0);
    }
}
