use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};

use super::background::{BackgroundAssets, BackgroundPass, BackgroundUniforms};
use super::depth_of_field::{DepthOfFieldPass, DofUniforms};
use super::edges::{EdgePass, EdgeUniforms};
use super::screen_pass::ScreenPass;
use super::shadows::{ShadowPass, ShadowUniforms};
use super::variants::PassVariants;
use crate::camera::{CameraProjection, Viewport};
use crate::error::PostFxError;
use crate::lighting::LightSet;
use crate::options::Options;
use crate::texture::depth::{DepthBuffer, DepthEncoding, SceneDepth};
use crate::texture::mip::{CubeMap, MipTexture};
use crate::texture::{ColorBuffer, EdgeMask, ShadowMask, TextureBuffer};
use crate::util::frame_timing::{timed, FrameTiming, PassTimings};
use crate::util::hash::hash_frame_state;
use crate::util::screen_space::is_background_depth;

/// Per-frame inputs shared by every pass.
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// Camera for this frame.
    pub camera: CameraProjection,
    /// Region of the target being drawn.
    pub viewport: Viewport,
    /// Shadow-casting lights in view space.
    pub lights: LightSet,
    /// Seed for the background dither.
    pub frame_time: f32,
    /// Depth-of-field focus point in view space; defaults to the view axis
    /// at `in_focus`.
    pub focus_center: Option<Vec3>,
}

impl FrameContext {
    /// Full-target viewport, no lights, time zero.
    #[must_use]
    pub fn new(camera: CameraProjection, width: u32, height: u32) -> Self {
        Self {
            camera,
            viewport: Viewport::full(width, height),
            lights: LightSet::new(),
            frame_time: 0.0,
            focus_center: None,
        }
    }
}

/// Everything one frame produced.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Final color.
    pub color: ColorBuffer,
    /// SMAA edge mask for a downstream blend pass.
    pub edges: Option<EdgeMask>,
    /// Shadow light factors, as applied to `color`.
    pub shadows: Option<ShadowMask>,
    /// Per-pass durations.
    pub timings: PassTimings,
}

/// The external geometry renderer, called between the background and the
/// screen-space passes by [`PostProcessStack::render_frame`].
pub trait SceneRenderer {
    /// Draw the scene over `target` (which already holds the background)
    /// and return its depth. The opaque layer must use `depth_encoding`.
    fn draw(
        &mut self,
        target: &mut ColorBuffer,
        camera: &CameraProjection,
        depth_encoding: DepthEncoding,
    ) -> Result<SceneDepth, PostFxError>;
}

/// Uniforms that only change with camera, viewport, target size, options,
/// or assets. Per-frame fields are patched on reuse.
struct UniformCache {
    key: u64,
    background: Option<BackgroundUniforms>,
    depth_of_field: Option<DofUniforms>,
    shadows: Option<ShadowUniforms>,
    edges: Option<EdgeUniforms>,
}

/// Owns the pass sequence: background → scene → shadows → depth of field
/// → edge detection.
pub struct PostProcessStack {
    options: Options,
    variants: PassVariants,
    assets: BackgroundAssets,
    width: u32,
    height: u32,
    cache: Option<UniformCache>,
    timing: FrameTiming,
}

impl PostProcessStack {
    /// Build a stack with no background assets attached.
    pub fn new(
        options: Options,
        width: u32,
        height: u32,
    ) -> Result<Self, PostFxError> {
        Self::with_assets(options, BackgroundAssets::default(), width, height)
    }

    /// Build a stack, resolving every pass variant up front.
    pub fn with_assets(
        options: Options,
        assets: BackgroundAssets,
        width: u32,
        height: u32,
    ) -> Result<Self, PostFxError> {
        check_dimensions(width, height)?;
        let variants = PassVariants::resolve(&options, &assets)?;
        log::info!(
            "post-process stack {width}x{height}: background {:?}, dof {:?}, \
             shadows {:?}, edges {}",
            variants.background,
            variants.depth_of_field,
            variants.shadows,
            variants.edges
        );
        Ok(Self {
            options,
            variants,
            assets,
            width,
            height,
            cache: None,
            timing: FrameTiming::new(),
        })
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolved pass variants.
    #[must_use]
    pub fn variants(&self) -> &PassVariants {
        &self.variants
    }

    /// `(width, height)` of every buffer this stack reads and writes.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Smoothed whole-frame timing across `render_frame` calls.
    #[must_use]
    pub fn frame_timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Swap options. On failure the previous options stay in effect.
    pub fn set_options(&mut self, options: Options) -> Result<(), PostFxError> {
        match PassVariants::resolve(&options, &self.assets) {
            Ok(variants) => {
                self.options = options;
                self.variants = variants;
                self.invalidate("options changed");
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected option update: {e}");
                Err(e)
            }
        }
    }

    /// Attach the image sampled by the image background.
    pub fn set_background_image(&mut self, image: MipTexture) {
        self.assets.image = Some(Arc::new(image));
        self.invalidate("background image changed");
    }

    /// Attach the cube map sampled by the skybox background.
    pub fn set_skybox(&mut self, skybox: CubeMap) {
        self.assets.skybox = Some(Arc::new(skybox));
        self.invalidate("skybox changed");
    }

    /// Change the buffer size for subsequent frames.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), PostFxError> {
        check_dimensions(width, height)?;
        if (width, height) != (self.width, self.height) {
            log::info!(
                "post-process resize {}x{} -> {width}x{height}",
                self.width,
                self.height
            );
            self.width = width;
            self.height = height;
            self.invalidate("resized");
        }
        Ok(())
    }

    fn invalidate(&mut self, reason: &str) {
        if self.cache.take().is_some() {
            log::debug!("uniform cache invalidated: {reason}");
        }
    }

    fn tex_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn cache_key(&self, frame: &FrameContext) -> u64 {
        let camera = &frame.camera;
        let image = self
            .assets
            .image
            .as_ref()
            .map_or(Vec2::ZERO, |i| Vec2::new(i.size().0 as f32, i.size().1 as f32));
        hash_frame_state(
            &[camera.projection(), camera.view()],
            &[
                frame.viewport.as_vec4(),
                Vec4::new(
                    self.width as f32,
                    self.height as f32,
                    camera.near(),
                    camera.far(),
                ),
                Vec4::new(
                    f32::from(u8::from(frame.viewport.adjusted)),
                    f32::from(u8::from(camera.is_orthographic())),
                    image.x,
                    image.y,
                ),
            ],
        )
    }

    /// Fetch the frame's uniforms, rebuilding when the camera, viewport or
    /// size changed and patching per-frame values otherwise.
    fn uniforms(&mut self, frame: &FrameContext) -> &UniformCache {
        let key = self.cache_key(frame);
        let mut cache = match self.cache.take() {
            Some(cache) if cache.key == key => cache,
            previous => {
                if previous.is_some() {
                    log::debug!(
                        "uniform cache invalidated: camera or viewport changed"
                    );
                }
                self.build_uniforms(key, frame)
            }
        };
        if let Some(u) = cache.background.as_mut() {
            u.frame_time = frame.frame_time;
        }
        if let Some(u) = cache.depth_of_field.as_mut() {
            let in_focus = self.options.depth_of_field.in_focus;
            u.focus_center = frame
                .focus_center
                .unwrap_or(Vec3::new(0.0, 0.0, -in_focus))
                .to_array();
        }
        if let Some(u) = cache.shadows.as_mut() {
            u.set_lights(&frame.lights);
        }
        self.cache.insert(cache)
    }

    fn build_uniforms(&self, key: u64, frame: &FrameContext) -> UniformCache {
        let tex_size = self.tex_size();
        let v = &self.variants;
        let o = &self.options;
        let image_size = self
            .assets
            .image
            .as_ref()
            .map(|i| Vec2::new(i.size().0 as f32, i.size().1 as f32));
        UniformCache {
            key,
            background: v.background.map(|_| {
                BackgroundUniforms::new(
                    &o.background,
                    &frame.camera,
                    &frame.viewport,
                    tex_size,
                    image_size,
                    frame.frame_time,
                )
            }),
            depth_of_field: v.depth_of_field.map(|mode| {
                DofUniforms::new(
                    &o.depth_of_field,
                    mode,
                    &frame.camera,
                    tex_size,
                    frame.focus_center,
                )
            }),
            shadows: v.shadows.map(|variant| {
                ShadowUniforms::new(
                    &o.shadows,
                    variant,
                    &frame.camera,
                    &frame.viewport,
                    tex_size,
                    &frame.lights,
                )
            }),
            edges: v
                .edges
                .then(|| EdgeUniforms::new(&o.antialiasing, tex_size)),
        }
    }

    fn check_frame(&self, frame: &FrameContext) -> Result<(), PostFxError> {
        frame.viewport.validate()?;
        if frame.camera.is_orthographic() != self.variants.orthographic {
            return Err(PostFxError::InvalidCamera(format!(
                "camera orthographic = {} but the stack decodes depth with \
                 orthographic = {}",
                frame.camera.is_orthographic(),
                self.variants.orthographic
            )));
        }
        Ok(())
    }

    /// Draw the background into a fresh color buffer. A disabled background
    /// yields transparent black.
    pub fn render_background(
        &mut self,
        frame: &FrameContext,
    ) -> Result<ColorBuffer, PostFxError> {
        self.check_frame(frame)?;
        let mut target = TextureBuffer::new(self.width, self.height, Vec4::ZERO);
        let variants = self.variants;
        let Some(variant) = variants.background else {
            return Ok(target);
        };
        let uniforms = self
            .uniforms(frame)
            .background
            .ok_or(PostFxError::MissingVariant("background"))?;
        let pass = BackgroundPass::new(
            variant,
            uniforms,
            &self.assets,
            variants.texture_lod,
        )?;
        pass.render(&mut target);
        Ok(target)
    }

    /// Run shadows, depth of field and edge detection over an already
    /// rendered frame.
    pub fn post_process(
        &mut self,
        frame: &FrameContext,
        mut color: ColorBuffer,
        depth: &SceneDepth,
    ) -> Result<FrameOutput, PostFxError> {
        self.check_frame(frame)?;
        let size = self.size();
        let variants = self.variants;
        color.check_size("color", size)?;
        depth
            .opaque
            .check("opaque depth", size, variants.depth_encoding)?;
        if let Some(transparent) = &depth.transparent {
            transparent.check("transparent depth", size, DepthEncoding::Packed)?;
        }

        let (shadow_uniforms, dof_uniforms, edge_uniforms) = {
            let cache = self.uniforms(frame);
            (cache.shadows, cache.depth_of_field, cache.edges)
        };
        let mut timings = PassTimings::default();

        let shadows = match (variants.shadows, shadow_uniforms) {
            (Some(variant), Some(uniforms)) => {
                let (mask, elapsed) = timed(|| {
                    let pass = ShadowPass::new(variant, uniforms, &depth.opaque);
                    let mut mask = TextureBuffer::new(size.0, size.1, 1.0);
                    pass.render(&mut mask);
                    apply_shadow_mask(&mut color, &mask, &depth.opaque);
                    mask
                });
                log::trace!("shadows: {elapsed:?}");
                timings.shadows = Some(elapsed);
                Some(mask)
            }
            _ => None,
        };

        if let (Some(mode), Some(uniforms)) = (variants.depth_of_field, dof_uniforms) {
            let (blurred, elapsed) = timed(|| {
                let pass = DepthOfFieldPass::new(
                    mode,
                    uniforms,
                    &color,
                    &depth.opaque,
                    depth.transparent.as_ref(),
                );
                let mut target = TextureBuffer::new(size.0, size.1, Vec4::ZERO);
                pass.render(&mut target);
                target
            });
            log::trace!("depth_of_field: {elapsed:?}");
            timings.depth_of_field = Some(elapsed);
            color = blurred;
        }

        let edges = match edge_uniforms {
            Some(uniforms) if variants.edges => {
                let (mask, elapsed) = timed(|| {
                    let pass = EdgePass::new(uniforms, &color);
                    let mut mask = TextureBuffer::new(size.0, size.1, Vec2::ZERO);
                    pass.render(&mut mask);
                    mask
                });
                log::trace!("edges: {elapsed:?}");
                timings.edges = Some(elapsed);
                Some(mask)
            }
            _ => None,
        };

        Ok(FrameOutput {
            color,
            edges,
            shadows,
            timings,
        })
    }

    /// Full frame: background, external scene, then the screen-space
    /// passes.
    pub fn render_frame(
        &mut self,
        frame: &FrameContext,
        scene: &mut impl SceneRenderer,
    ) -> Result<FrameOutput, PostFxError> {
        self.timing.begin_frame();
        let (background, background_time) = timed(|| self.render_background(frame));
        let mut color = background?;
        log::trace!("background: {background_time:?}");

        let encoding = self.variants.depth_encoding;
        let (depth, scene_time) =
            timed(|| scene.draw(&mut color, &frame.camera, encoding));
        let depth = depth?;
        log::trace!("scene: {scene_time:?}");

        let mut output = self.post_process(frame, color, &depth)?;
        output.timings.background =
            self.variants.background.map(|_| background_time);
        output.timings.scene = Some(scene_time);
        let total = self.timing.end_frame();
        log::trace!(
            "frame {}: {total:?} (smoothed {:.2} ms)",
            self.timing.frame_count(),
            self.timing.smoothed_ms()
        );
        Ok(output)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), PostFxError> {
    if width == 0 || height == 0 {
        return Err(PostFxError::InvalidParameter {
            name: "size",
            reason: format!("{width}x{height} is empty"),
        });
    }
    Ok(())
}

/// Darken lit geometry by the shadow mask. Background pixels keep their
/// color.
fn apply_shadow_mask(color: &mut ColorBuffer, mask: &ShadowMask, depth: &DepthBuffer) {
    let width = color.width() as usize;
    color
        .texels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, texel) in row.iter_mut().enumerate() {
                let (x, y) = (x as u32, y as u32);
                if is_background_depth(depth.depth_at(x, y)) {
                    continue;
                }
                let factor = mask.texel(i64::from(x), i64::from(y));
                *texel = (texel.truncate() * factor).extend(texel.w);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::LightDescriptor;
    use crate::options::BackgroundVariant;
    use crate::util::screen_space::view_z_to_depth;

    const W: u32 = 24;
    const H: u32 = 16;

    fn camera() -> CameraProjection {
        CameraProjection::perspective(1.0, W as f32 / H as f32, 0.1, 100.0)
            .unwrap()
    }

    /// Draws a grey quad at z = -2 in the middle of the screen over a plane
    /// at z = -5 on the left half.
    struct QuadScene {
        calls: usize,
    }

    impl SceneRenderer for QuadScene {
        fn draw(
            &mut self,
            target: &mut ColorBuffer,
            camera: &CameraProjection,
            depth_encoding: DepthEncoding,
        ) -> Result<SceneDepth, PostFxError> {
            self.calls += 1;
            let (near, far) = (camera.near(), camera.far());
            let quad = view_z_to_depth(-2.0, near, far, false);
            let plane = view_z_to_depth(-5.0, near, far, false);
            let mut depths = TextureBuffer::new(W, H, 1.0);
            for y in 0..H {
                for x in 0..W {
                    let d = if (8..16).contains(&x) && (4..12).contains(&y) {
                        quad
                    } else if x < W / 2 {
                        plane
                    } else {
                        continue;
                    };
                    depths.set(x, y, d);
                    target.set(x, y, Vec4::new(0.5, 0.5, 0.5, 1.0));
                }
            }
            Ok(SceneDepth::opaque(DepthBuffer::encode(&depths, depth_encoding)))
        }
    }

    fn frame_with_light() -> FrameContext {
        let mut frame = FrameContext::new(camera(), W, H);
        frame.lights = LightSet::from_slice(&[LightDescriptor::new(
            Vec3::Z,
            Vec3::ONE,
        )])
        .unwrap();
        frame
    }

    #[test]
    fn defaults_run_background_and_edges_only() {
        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let mut scene = QuadScene { calls: 0 };
        let out = stack.render_frame(&frame_with_light(), &mut scene).unwrap();
        assert_eq!(scene.calls, 1);
        assert!(out.shadows.is_none());
        assert!(out.edges.is_some());
        assert!(out.timings.background.is_some());
        assert!(out.timings.depth_of_field.is_none());
        assert_eq!(out.color.size(), (W, H));
        assert_eq!(stack.frame_timing().frame_count(), 1);
    }

    #[test]
    fn shadows_darken_geometry_but_not_background() {
        let mut options = Options::default();
        options.shadows.enabled = true;
        let mut stack = PostProcessStack::new(options, W, H).unwrap();
        let frame = frame_with_light();
        let background = stack.render_background(&frame).unwrap();
        let mut scene = QuadScene { calls: 0 };
        let out = stack.render_frame(&frame, &mut scene).unwrap();
        let mask = out.shadows.unwrap();

        // Quad center marches straight into itself.
        assert!(mask.texel(12, 8) < 1.0);
        assert!(out.color.texel(12, 8).x < 0.5);
        // Empty right-hand background keeps its color and has mask 0.
        assert_eq!(mask.texel(20, 2), 0.0);
        assert_eq!(out.color.texel(20, 2), background.texel(20, 2));
    }

    /// Flat white surface at z = -2 covering the whole target.
    struct WallScene;

    impl SceneRenderer for WallScene {
        fn draw(
            &mut self,
            target: &mut ColorBuffer,
            camera: &CameraProjection,
            depth_encoding: DepthEncoding,
        ) -> Result<SceneDepth, PostFxError> {
            let d = view_z_to_depth(-2.0, camera.near(), camera.far(), false);
            target.texels_mut().fill(Vec4::ONE);
            let depths = TextureBuffer::new(W, H, d);
            Ok(SceneDepth::opaque(DepthBuffer::encode(&depths, depth_encoding)))
        }
    }

    #[test]
    fn depth_of_field_blurs_the_shadowed_color() {
        let mut options = Options::default();
        options.shadows.enabled = true;
        options.depth_of_field.enabled = true;
        let mut stack = PostProcessStack::new(options, W, H).unwrap();
        let out = stack
            .render_frame(&frame_with_light(), &mut WallScene)
            .unwrap();
        let mask = out.shadows.unwrap();

        let lit = mask.texel(12, 8);
        assert!(lit < 1.0, "{lit}");
        let color = out.color.texel(12, 8);
        assert!(color.x < 1.0, "{color}");
        assert!((color.x - lit).abs() < 1e-4, "{color} vs {lit}");
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn edges_are_detected_on_the_blurred_color() {
        let mut sharp_options = Options::default();
        sharp_options.depth_of_field.blur_spread = 2.0;
        let mut blurred_options = sharp_options.clone();
        blurred_options.depth_of_field.enabled = true;

        let frame = FrameContext::new(camera(), W, H);
        let sharp = PostProcessStack::new(sharp_options, W, H)
            .unwrap()
            .render_frame(&frame, &mut QuadScene { calls: 0 })
            .unwrap();
        let blurred = PostProcessStack::new(blurred_options.clone(), W, H)
            .unwrap()
            .render_frame(&frame, &mut QuadScene { calls: 0 })
            .unwrap();
        assert!(blurred.timings.depth_of_field.is_some());
        assert_ne!(blurred.color, sharp.color);

        let uniforms = EdgeUniforms::new(
            &blurred_options.antialiasing,
            blurred.color.tex_size(),
        );
        let mut expected = TextureBuffer::new(W, H, Vec2::ZERO);
        EdgePass::new(uniforms, &blurred.color).render(&mut expected);
        assert_eq!(blurred.edges, Some(expected));
    }

    #[test]
    fn disabled_background_is_transparent_black() {
        let mut options = Options::default();
        options.background.enabled = false;
        let mut stack = PostProcessStack::new(options, W, H).unwrap();
        let bg = stack.render_background(&FrameContext::new(camera(), W, H)).unwrap();
        assert!(bg.texels().iter().all(|t| *t == Vec4::ZERO));
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let frame = FrameContext::new(camera(), W, H);
        let color = TextureBuffer::new(W, H + 1, Vec4::ZERO);
        let depth =
            SceneDepth::opaque(DepthBuffer::cleared(W, H, DepthEncoding::Native));
        assert!(matches!(
            stack.post_process(&frame, color, &depth),
            Err(PostFxError::BufferSize { buffer: "color", .. })
        ));

        let color = TextureBuffer::new(W, H, Vec4::ZERO);
        let packed =
            SceneDepth::opaque(DepthBuffer::cleared(W, H, DepthEncoding::Packed));
        assert!(matches!(
            stack.post_process(&frame, color, &packed),
            Err(PostFxError::DepthEncoding(_))
        ));
    }

    #[test]
    fn native_transparent_depth_is_rejected() {
        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let frame = FrameContext::new(camera(), W, H);
        let depth = SceneDepth {
            opaque: DepthBuffer::cleared(W, H, DepthEncoding::Native),
            transparent: Some(DepthBuffer::cleared(W, H, DepthEncoding::Native)),
        };
        let color = TextureBuffer::new(W, H, Vec4::ZERO);
        assert!(matches!(
            stack.post_process(&frame, color, &depth),
            Err(PostFxError::DepthEncoding(_))
        ));
    }

    #[test]
    fn camera_must_match_depth_decoding() {
        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let ortho = CameraProjection::orthographic(4.0, 1.5, 0.0, 10.0).unwrap();
        assert!(matches!(
            stack.render_background(&FrameContext::new(ortho, W, H)),
            Err(PostFxError::InvalidCamera(_))
        ));
    }

    #[test]
    fn failed_option_update_keeps_previous_state() {
        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let before = *stack.variants();
        let mut bad = Options::default();
        bad.background.variant = BackgroundVariant::Skybox;
        assert!(stack.set_options(bad).is_err());
        assert_eq!(*stack.variants(), before);
        assert_eq!(stack.options(), &Options::default());
    }

    #[test]
    fn cache_follows_camera_changes() {
        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let frame = FrameContext::new(camera(), W, H);
        let _ = stack.render_background(&frame).unwrap();
        let first = stack.cache.as_ref().map(|c| c.key);

        let mut later = frame.clone();
        later.frame_time = 3.0;
        let _ = stack.render_background(&later).unwrap();
        assert_eq!(stack.cache.as_ref().map(|c| c.key), first);
        assert_eq!(
            stack.cache.as_ref().and_then(|c| c.background).map(|u| u.frame_time),
            Some(3.0)
        );

        let rotated = camera().with_view(glam::Mat4::from_rotation_y(0.3));
        let moved = FrameContext::new(rotated, W, H);
        let _ = stack.render_background(&moved).unwrap();
        assert_ne!(stack.cache.as_ref().map(|c| c.key), first);

        stack.resize(W * 2, H).unwrap();
        assert!(stack.cache.is_none());
    }

    #[test]
    fn image_background_needs_attached_image() {
        let mut options = Options::default();
        options.background.variant = BackgroundVariant::Image;
        assert!(PostProcessStack::new(options.clone(), W, H).is_err());

        let mut stack = PostProcessStack::new(Options::default(), W, H).unwrap();
        let image = MipTexture::new(TextureBuffer::new(4, 4, Vec4::ONE)).unwrap();
        stack.set_background_image(image);
        stack.set_options(options).unwrap();
        let bg = stack.render_background(&FrameContext::new(camera(), W, H)).unwrap();
        assert!(bg.texel(3, 3).x > 0.99);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(PostProcessStack::new(Options::default(), 0, H).is_err());
    }
}
