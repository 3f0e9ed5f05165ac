//! Depth buffers in native or RGBA-packed form.
//!
//! Targets without depth-texture support store depth in an 8-bit RGBA color
//! attachment. The packed form is a 32-bit fixed-point value spread over the
//! four channels, most significant byte first, which keeps far more than 16
//! bits of precision and encodes the background sentinel `1.0` exactly.

use glam::Vec2;

use super::TextureBuffer;
use crate::error::PostFxError;
use crate::util::screen_space::BACKGROUND_DEPTH;

const PACK_SCALE: f64 = u32::MAX as f64;

/// Pack a normalized depth value into four 8-bit channels.
#[inline]
#[must_use]
pub fn pack_depth_rgba(depth: f32) -> [u8; 4] {
    let d = f64::from(depth.clamp(0.0, 1.0));
    ((d * PACK_SCALE).round() as u32).to_be_bytes()
}

/// Inverse of [`pack_depth_rgba`].
#[inline]
#[must_use]
pub fn unpack_rgba_depth(rgba: [u8; 4]) -> f32 {
    (f64::from(u32::from_be_bytes(rgba)) / PACK_SCALE) as f32
}

/// How a depth buffer stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthEncoding {
    /// Single-channel float depth.
    Native,
    /// Depth packed into RGBA8.
    Packed,
}

/// A depth buffer in one of the two encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthBuffer {
    /// Single-channel float depth.
    Native(TextureBuffer<f32>),
    /// RGBA8-packed depth.
    Packed(TextureBuffer<[u8; 4]>),
}

impl DepthBuffer {
    /// A buffer cleared to the background sentinel.
    #[must_use]
    pub fn cleared(width: u32, height: u32, encoding: DepthEncoding) -> Self {
        match encoding {
            DepthEncoding::Native => {
                Self::Native(TextureBuffer::new(width, height, BACKGROUND_DEPTH))
            }
            DepthEncoding::Packed => Self::Packed(TextureBuffer::new(
                width,
                height,
                pack_depth_rgba(BACKGROUND_DEPTH),
            )),
        }
    }

    /// Encode a float depth grid with the requested encoding.
    #[must_use]
    pub fn encode(depths: &TextureBuffer<f32>, encoding: DepthEncoding) -> Self {
        match encoding {
            DepthEncoding::Native => Self::Native(depths.clone()),
            DepthEncoding::Packed => {
                let (w, h) = depths.size();
                Self::Packed(TextureBuffer::from_fn(w, h, |x, y| {
                    pack_depth_rgba(depths.texel(i64::from(x), i64::from(y)))
                }))
            }
        }
    }

    /// Storage encoding of this buffer.
    #[must_use]
    pub fn encoding(&self) -> DepthEncoding {
        match self {
            Self::Native(_) => DepthEncoding::Native,
            Self::Packed(_) => DepthEncoding::Packed,
        }
    }

    /// `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Native(b) => b.size(),
            Self::Packed(b) => b.size(),
        }
    }

    /// Decoded depth at `uv` (nearest texel).
    #[inline]
    #[must_use]
    pub fn sample(&self, uv: Vec2) -> f32 {
        match self {
            Self::Native(b) => b.sample_nearest(uv),
            Self::Packed(b) => unpack_rgba_depth(b.sample_nearest(uv)),
        }
    }

    /// Decoded depth at integer texel coordinates.
    #[must_use]
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        let (x, y) = (i64::from(x), i64::from(y));
        match self {
            Self::Native(b) => b.texel(x, y),
            Self::Packed(b) => unpack_rgba_depth(b.texel(x, y)),
        }
    }

    /// Reject the buffer unless it matches `expected` size and encoding.
    pub fn check(
        &self,
        buffer: &'static str,
        expected: (u32, u32),
        encoding: DepthEncoding,
    ) -> Result<(), PostFxError> {
        if self.size() != expected {
            return Err(PostFxError::BufferSize {
                buffer,
                expected,
                actual: self.size(),
            });
        }
        if self.encoding() != encoding {
            return Err(PostFxError::DepthEncoding(match encoding {
                DepthEncoding::Native => {
                    "native depth texture support is enabled but the buffer \
                     is packed"
                }
                DepthEncoding::Packed => {
                    "buffer is native depth but the pipeline decodes packed \
                     depth"
                }
            }));
        }
        Ok(())
    }
}

/// Depth produced by the external scene renderer for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDepth {
    /// Opaque geometry; encoding follows the native-depth capability.
    pub opaque: DepthBuffer,
    /// Transparent geometry, always packed. `None` means no transparent
    /// geometry was drawn.
    pub transparent: Option<DepthBuffer>,
}

impl SceneDepth {
    /// Depth with only an opaque layer.
    #[must_use]
    pub fn opaque(opaque: DepthBuffer) -> Self {
        Self {
            opaque,
            transparent: None,
        }
    }
}
