//! Directional lights seen by the screen-space shadow pass.

use glam::Vec3;

use crate::error::PostFxError;

/// Maximum number of lights the shadow pass marches per pixel.
///
/// Shadow cost scales with `lights × steps`, so the count is bounded at
/// setup rather than per pixel.
pub const MAX_SHADOW_LIGHTS: usize = 8;

/// A directional light in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescriptor {
    /// Direction the light travels (from the light toward the scene).
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
}

impl LightDescriptor {
    /// A light with a normalized `direction`.
    #[must_use]
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
        }
    }
}

/// Fixed-capacity list of lights for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSet {
    lights: [LightDescriptor; MAX_SHADOW_LIGHTS],
    len: usize,
}

impl Default for LightSet {
    fn default() -> Self {
        Self {
            lights: [LightDescriptor {
                direction: Vec3::ZERO,
                color: Vec3::ZERO,
            }; MAX_SHADOW_LIGHTS],
            len: 0,
        }
    }
}

impl LightSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a slice, failing if it exceeds [`MAX_SHADOW_LIGHTS`].
    pub fn from_slice(lights: &[LightDescriptor]) -> Result<Self, PostFxError> {
        if lights.len() > MAX_SHADOW_LIGHTS {
            return Err(PostFxError::TooManyLights {
                requested: lights.len(),
                capacity: MAX_SHADOW_LIGHTS,
            });
        }
        let mut set = Self::new();
        for light in lights {
            set.push(*light)?;
        }
        Ok(set)
    }

    /// Append a light.
    pub fn push(&mut self, light: LightDescriptor) -> Result<(), PostFxError> {
        if self.len == MAX_SHADOW_LIGHTS {
            return Err(PostFxError::TooManyLights {
                requested: self.len + 1,
                capacity: MAX_SHADOW_LIGHTS,
            });
        }
        self.lights[self.len] = light;
        self.len += 1;
        Ok(())
    }

    /// Number of lights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set has no lights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The active lights.
    #[must_use]
    pub fn as_slice(&self) -> &[LightDescriptor] {
        &self.lights[..self.len]
    }
}
