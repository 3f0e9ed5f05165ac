//! CPU render-target textures.
//!
//! A [`TextureBuffer`] is a typed 2D texel grid that passes read through
//! sampling helpers and write through [`TextureBuffer::shade_parallel`].
//! Row 0 is the bottom row so that texel `(x, y)` sits at fragment
//! coordinate `(x + 0.5, y + 0.5)` and UV `(0, 0)` is the bottom-left
//! corner.

/// Native and packed depth buffers.
pub mod depth;
/// Mip chains and cube maps for blurred background sampling.
pub mod mip;

use glam::{Vec2, Vec4};
use rayon::prelude::{IndexedParallelIterator, ParallelIterator, ParallelSliceMut};

use crate::error::PostFxError;

/// RGBA color target in linear space.
pub type ColorBuffer = TextureBuffer<Vec4>;
/// Two-channel edge mask: `x` = horizontal edge, `y` = vertical edge.
pub type EdgeMask = TextureBuffer<Vec2>;
/// Single-channel shadow visibility mask.
pub type ShadowMask = TextureBuffer<f32>;

/// A typed 2D texel grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBuffer<T> {
    width: u32,
    height: u32,
    texels: Vec<T>,
}

impl<T: Copy> TextureBuffer<T> {
    /// Create a buffer with every texel set to `fill`.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: T) -> Self {
        Self {
            width,
            height,
            texels: vec![fill; width as usize * height as usize],
        }
    }

    /// Wrap an existing row-major (bottom row first) texel vector.
    pub fn from_texels(
        width: u32,
        height: u32,
        texels: Vec<T>,
    ) -> Result<Self, PostFxError> {
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(PostFxError::BufferSize {
                buffer: "texel data",
                expected: (width, height),
                actual: (texels.len() as u32, 1),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every texel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> T) -> Self {
        let mut texels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            texels,
        }
    }

    /// Width in texels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size as a float vector, the `uTexSize` of the passes.
    #[must_use]
    pub fn tex_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Row-major texels, bottom row first.
    #[must_use]
    pub fn texels(&self) -> &[T] {
        &self.texels
    }

    /// Mutable row-major texels, bottom row first.
    pub fn texels_mut(&mut self) -> &mut [T] {
        &mut self.texels
    }

    /// Consume the buffer, returning its texels.
    #[must_use]
    pub fn into_texels(self) -> Vec<T> {
        self.texels
    }

    /// Texel at integer coordinates, clamped to the edge.
    ///
    /// # Panics
    ///
    /// Never for non-empty buffers; callers must not sample empty ones.
    #[inline]
    #[must_use]
    pub fn texel(&self, x: i64, y: i64) -> T {
        let cx = x.clamp(0, i64::from(self.width) - 1) as usize;
        let cy = y.clamp(0, i64::from(self.height) - 1) as usize;
        self.texels[cy * self.width as usize + cx]
    }

    /// Overwrite the texel at `(x, y)`; out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            self.texels[idx] = value;
        }
    }

    /// Nearest-texel lookup at normalized `uv`, clamp-to-edge addressing.
    #[inline]
    #[must_use]
    pub fn sample_nearest(&self, uv: Vec2) -> T {
        let x = (uv.x * self.width as f32).floor() as i64;
        let y = (uv.y * self.height as f32).floor() as i64;
        self.texel(x, y)
    }

    /// Whether the buffer has zero texels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// Reject the buffer unless it is exactly `expected` in size.
    pub fn check_size(
        &self,
        buffer: &'static str,
        expected: (u32, u32),
    ) -> Result<(), PostFxError> {
        if self.size() == expected {
            Ok(())
        } else {
            Err(PostFxError::BufferSize {
                buffer,
                expected,
                actual: self.size(),
            })
        }
    }
}

impl<T: Copy + Send + Sync> TextureBuffer<T> {
    /// Evaluate `shade(frag_coord)` for every texel in parallel.
    ///
    /// Rows are distributed across the rayon pool. `shade` only receives the
    /// fragment coordinate, so it cannot observe other texels of this
    /// buffer; inputs must live elsewhere.
    pub fn shade_parallel(&mut self, shade: impl Fn(Vec2) -> T + Sync) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        self.texels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let fy = y as f32 + 0.5;
                for (x, texel) in row.iter_mut().enumerate() {
                    *texel = shade(Vec2::new(x as f32 + 0.5, fy));
                }
            });
    }
}

impl TextureBuffer<Vec4> {
    /// Bilinear lookup at normalized `uv`, clamp-to-edge addressing.
    #[must_use]
    pub fn sample_linear(&self, uv: Vec2) -> Vec4 {
        let p = uv * self.tex_size() - Vec2::splat(0.5);
        let base = p.floor();
        let f = p - base;
        let (x0, y0) = (base.x as i64, base.y as i64);
        let bottom = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), f.x);
        let top = self
            .texel(x0, y0 + 1)
            .lerp(self.texel(x0 + 1, y0 + 1), f.x);
        bottom.lerp(top, f.y)
    }
}
