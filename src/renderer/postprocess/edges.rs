//! SMAA color edge detection (1x medium preset).
//!
//! Produces a two-channel mask: `x` marks an edge against the left
//! neighbour, `y` against the top neighbour. Blending weights and the final
//! neighbourhood blend are left to downstream passes.

use glam::{Vec2, Vec3};

use super::screen_pass::ScreenPass;
use crate::options::AntialiasingOptions;
use crate::texture::ColorBuffer;
use crate::util::color::luminance;
use crate::util::screen_space::step;

/// Edge-detection uniforms - must match WGSL struct
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EdgeUniforms {
    /// `1 / tex_size`.
    pub tex_size_inv: [f32; 2],
    /// Minimum delta treated as an edge.
    pub threshold: f32,
    /// Padding for GPU alignment.
    pub _pad: f32,
}

impl EdgeUniforms {
    /// Derive the uniforms for a target of `tex_size` pixels.
    #[must_use]
    pub fn new(options: &AntialiasingOptions, tex_size: Vec2) -> Self {
        Self {
            tex_size_inv: (Vec2::ONE / tex_size).to_array(),
            threshold: options.edge_threshold,
            _pad: 0.0,
        }
    }
}

/// Neighbour offsets in UV units, computed once per target size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeTexelOffsets {
    /// One texel left.
    pub left: Vec2,
    /// One texel up.
    pub top: Vec2,
    /// One texel right.
    pub right: Vec2,
    /// One texel down.
    pub bottom: Vec2,
    /// Two texels left.
    pub left_left: Vec2,
    /// Two texels up.
    pub top_top: Vec2,
}

impl EdgeTexelOffsets {
    /// Scale the unit offsets by the texel size.
    #[must_use]
    pub fn new(tex_size_inv: Vec2) -> Self {
        Self {
            left: Vec2::new(-1.0, 0.0) * tex_size_inv,
            top: Vec2::new(0.0, 1.0) * tex_size_inv,
            right: Vec2::new(1.0, 0.0) * tex_size_inv,
            bottom: Vec2::new(0.0, -1.0) * tex_size_inv,
            left_left: Vec2::new(-2.0, 0.0) * tex_size_inv,
            top_top: Vec2::new(0.0, 2.0) * tex_size_inv,
        }
    }
}

/// One frame of edge detection over a color buffer.
pub struct EdgePass<'a> {
    color: &'a ColorBuffer,
    offsets: EdgeTexelOffsets,
    uniforms: EdgeUniforms,
}

impl<'a> EdgePass<'a> {
    /// Bind the pass to this frame's color.
    #[must_use]
    pub fn new(uniforms: EdgeUniforms, color: &'a ColorBuffer) -> Self {
        Self {
            color,
            offsets: EdgeTexelOffsets::new(Vec2::from(uniforms.tex_size_inv)),
            uniforms,
        }
    }

    fn rgb(&self, uv: Vec2) -> Vec3 {
        self.color.sample_nearest(uv).truncate()
    }
}

/// Largest channel difference plus luma difference.
fn color_delta(c: Vec3, l: f32, other: Vec3) -> f32 {
    (c - other).abs().max_element() + (l - luminance(other)).abs()
}

impl ScreenPass for EdgePass<'_> {
    type Texel = Vec2;

    fn label(&self) -> &'static str {
        "edges"
    }

    fn shade(&self, frag_coord: Vec2) -> Vec2 {
        let uv = frag_coord * Vec2::from(self.uniforms.tex_size_inv);
        let o = &self.offsets;
        let c = self.rgb(uv);
        let l = luminance(c);
        let delta = |offset: Vec2| color_delta(c, l, self.rgb(uv + offset));

        let left = delta(o.left);
        let top = delta(o.top);
        let threshold = self.uniforms.threshold;
        let mut edges =
            Vec2::new(step(threshold, left), step(threshold, top));
        if edges == Vec2::ZERO {
            return Vec2::ZERO;
        }

        let max_delta = left.max(top).max(delta(o.right)).max(delta(o.bottom));
        let max_delta = max_delta.max(delta(o.left_left)).max(delta(o.top_top));

        // Local contrast adaptation.
        edges *= Vec2::new(
            step(0.5 * max_delta, left),
            step(0.5 * max_delta, top),
        );
        edges
    }
}
