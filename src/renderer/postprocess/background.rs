//! Background compositor: skybox, image, or gradient behind the scene.

use std::sync::Arc;

use glam::{EulerRot, Mat3, Mat4, Vec2, Vec3, Vec4};

use super::screen_pass::ScreenPass;
use crate::camera::{CameraProjection, Viewport};
use crate::error::PostFxError;
use crate::options::{BackgroundOptions, BackgroundVariant};
use crate::texture::mip::{CubeMap, MipTexture};
use crate::util::color::{lighten_color, saturate_color, screen_space_dither};

/// Mip-level multiplier applied to `blur` for image and skybox sampling.
const BLUR_LOD_SCALE: f32 = 8.0;

/// Textures the image and skybox variants sample from.
#[derive(Debug, Clone, Default)]
pub struct BackgroundAssets {
    /// Image for [`BackgroundVariant::Image`].
    pub image: Option<Arc<MipTexture>>,
    /// Cube map for [`BackgroundVariant::Skybox`].
    pub skybox: Option<Arc<CubeMap>>,
}

/// Background uniforms - must match WGSL struct
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BackgroundUniforms {
    /// `inverse(projection * view_rotation)`, for skybox directions.
    pub view_direction_projection_inverse: [[f32; 4]; 4],
    /// Skybox rotation as three padded columns.
    pub rotation: [[f32; 4]; 3],
    /// Viewport `(x, y, width, height)` in pixels.
    pub viewport: [f32; 4],
    /// Gradient color A (top / center).
    pub color_a: [f32; 3],
    /// Gradient offset.
    pub ratio: f32,
    /// Gradient color B (bottom / rim).
    pub color_b: [f32; 3],
    /// Image/skybox blur.
    pub blur: f32,
    /// Image display size in pixels.
    pub image_scale: [f32; 2],
    /// Image coordinate offset.
    pub image_offset: [f32; 2],
    /// Target size in pixels.
    pub tex_size: [f32; 2],
    /// Output alpha.
    pub opacity: f32,
    /// Saturation shift.
    pub saturation: f32,
    /// Additive lightness.
    pub lightness: f32,
    /// Dither seed.
    pub frame_time: f32,
    /// Non-zero when fragment coordinates are remapped into the viewport.
    pub viewport_adjusted: u32,
    /// Padding for GPU alignment.
    pub _pad: f32,
}

impl BackgroundUniforms {
    /// Derive the uniforms for one frame. `image_size` enables the cover
    /// fit; without an image the scale is the target size.
    #[must_use]
    pub fn new(
        options: &BackgroundOptions,
        camera: &CameraProjection,
        viewport: &Viewport,
        tex_size: Vec2,
        image_size: Option<Vec2>,
        frame_time: f32,
    ) -> Self {
        let [rx, ry, rz] = options.rotation.map(f32::to_radians);
        let rotation = Mat3::from_euler(EulerRot::XYZ, rx, ry, rz);
        let (image_scale, image_offset) = match image_size {
            Some(size) => cover_fit(size, tex_size),
            None => (tex_size, Vec2::ZERO),
        };
        Self {
            view_direction_projection_inverse: camera
                .view_direction_projection_inverse()
                .to_cols_array_2d(),
            rotation: [
                rotation.x_axis.extend(0.0).to_array(),
                rotation.y_axis.extend(0.0).to_array(),
                rotation.z_axis.extend(0.0).to_array(),
            ],
            viewport: viewport.as_vec4().to_array(),
            color_a: options.color_a,
            ratio: options.ratio,
            color_b: options.color_b,
            blur: options.blur,
            image_scale: image_scale.to_array(),
            image_offset: image_offset.to_array(),
            tex_size: tex_size.to_array(),
            opacity: options.opacity,
            saturation: options.saturation,
            lightness: options.lightness,
            frame_time,
            viewport_adjusted: u32::from(viewport.adjusted),
            _pad: 0.0,
        }
    }
}

/// Scale and offset that cover the whole target with the image, cropping
/// the overflowing axis symmetrically.
#[must_use]
pub fn cover_fit(image_size: Vec2, tex_size: Vec2) -> (Vec2, Vec2) {
    let r = (tex_size.x / image_size.x).max(tex_size.y / image_size.y);
    let scale = image_size * r;
    let offset = (Vec2::ONE - tex_size / scale) * 0.5;
    (scale, offset)
}

enum Source<'a> {
    Skybox(&'a CubeMap),
    Image(&'a MipTexture),
    Gradient,
}

/// One frame of the background compositor.
pub struct BackgroundPass<'a> {
    variant: BackgroundVariant,
    source: Source<'a>,
    texture_lod: bool,
    direction_inverse: Mat4,
    rotation: Mat3,
    viewport: Viewport,
    uniforms: BackgroundUniforms,
}

impl<'a> BackgroundPass<'a> {
    /// Bind a variant to its asset. Fails if the variant needs an asset
    /// that is not attached.
    pub fn new(
        variant: BackgroundVariant,
        uniforms: BackgroundUniforms,
        assets: &'a BackgroundAssets,
        texture_lod: bool,
    ) -> Result<Self, PostFxError> {
        let source = match variant {
            BackgroundVariant::Skybox => Source::Skybox(
                assets
                    .skybox
                    .as_deref()
                    .ok_or(PostFxError::MissingAsset("skybox cube map"))?,
            ),
            BackgroundVariant::Image => Source::Image(
                assets
                    .image
                    .as_deref()
                    .ok_or(PostFxError::MissingAsset("background image"))?,
            ),
            BackgroundVariant::HorizontalGradient
            | BackgroundVariant::RadialGradient => Source::Gradient,
        };
        let [c0, c1, c2] = uniforms.rotation;
        let [vx, vy, vw, vh] = uniforms.viewport;
        Ok(Self {
            variant,
            source,
            texture_lod,
            direction_inverse: Mat4::from_cols_array_2d(
                &uniforms.view_direction_projection_inverse,
            ),
            rotation: Mat3::from_cols(
                Vec4::from(c0).truncate(),
                Vec4::from(c1).truncate(),
                Vec4::from(c2).truncate(),
            ),
            viewport: Viewport {
                x: vx,
                y: vy,
                width: vw,
                height: vh,
                adjusted: uniforms.viewport_adjusted != 0,
            },
            uniforms,
        })
    }

    fn lod(&self) -> f32 {
        if self.texture_lod {
            self.uniforms.blur * BLUR_LOD_SCALE
        } else {
            0.0
        }
    }

    fn base_color(&self, frag_coord: Vec2) -> Vec3 {
        let u = &self.uniforms;
        let tex_size = Vec2::from(u.tex_size);
        let coord = self.viewport.adjust(frag_coord, tex_size);
        let color_a = Vec3::from(u.color_a);
        let color_b = Vec3::from(u.color_b);

        match (&self.source, self.variant) {
            (Source::Skybox(cube), _) => {
                let ndc = (coord / tex_size) * 2.0 - Vec2::ONE;
                let t = self.direction_inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
                let dir = self.rotation * (t.truncate() / t.w).normalize_or_zero();
                cube.sample(dir, self.lod()).truncate()
            }
            (Source::Image(image), _) => {
                let coords = coord / Vec2::from(u.image_scale)
                    + Vec2::from(u.image_offset);
                image
                    .sample_lod(Vec2::new(coords.x, 1.0 - coords.y), self.lod())
                    .truncate()
            }
            (Source::Gradient, BackgroundVariant::RadialGradient) => {
                let d = (coord / tex_size).distance(Vec2::splat(0.5)) + u.ratio
                    - 0.5;
                color_b.lerp(color_a, 1.0 - d.clamp(0.0, 1.0))
            }
            (Source::Gradient, _) => {
                let d = coord.y / tex_size.y + 1.0 - 2.0 * u.ratio;
                color_b.lerp(color_a, d.clamp(0.0, 1.0))
            }
        }
    }
}

impl ScreenPass for BackgroundPass<'_> {
    type Texel = Vec4;

    fn label(&self) -> &'static str {
        "background"
    }

    fn shade(&self, frag_coord: Vec2) -> Vec4 {
        let u = &self.uniforms;
        let mut color = self.base_color(frag_coord);
        color = saturate_color(color, u.saturation);
        color = lighten_color(color, u.lightness);
        color += screen_space_dither(frag_coord, u.frame_time);
        color.extend(u.opacity)
    }
}
