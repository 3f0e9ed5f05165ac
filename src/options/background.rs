use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{check_range, PostFxError};

/// Which background branch the compositor runs.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundVariant {
    /// Environment cube map sampled by view direction.
    Skybox,
    /// Flat image stretched or cropped over the viewport.
    Image,
    /// Vertical blend between two colors.
    #[default]
    HorizontalGradient,
    /// Blend by distance from the viewport center.
    RadialGradient,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Background", inline)]
#[serde(default)]
/// Background compositor parameters.
pub struct BackgroundOptions {
    /// Draw a background at all; disabled clears to transparent black.
    #[schemars(title = "Enabled")]
    pub enabled: bool,
    /// Background branch.
    #[schemars(title = "Style")]
    pub variant: BackgroundVariant,
    /// Gradient color at the top / center.
    #[schemars(skip)]
    pub color_a: [f32; 3],
    /// Gradient color at the bottom / rim.
    #[schemars(skip)]
    pub color_b: [f32; 3],
    /// Gradient offset; 0.5 centers the blend.
    #[schemars(title = "Gradient Ratio", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub ratio: f32,
    /// Output alpha.
    #[schemars(title = "Opacity", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub opacity: f32,
    /// Saturation shift (-1 = greyscale).
    #[schemars(title = "Saturation", range(min = -1.0, max = 1.0), extend("step" = 0.01))]
    pub saturation: f32,
    /// Additive lightness shift.
    #[schemars(title = "Lightness", range(min = -1.0, max = 1.0), extend("step" = 0.01))]
    pub lightness: f32,
    /// Image/skybox blur; scales the sampled mip level.
    #[schemars(title = "Blur", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub blur: f32,
    /// Skybox rotation as XYZ Euler angles in degrees.
    #[schemars(skip)]
    pub rotation: [f32; 3],
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            variant: BackgroundVariant::HorizontalGradient,
            color_a: [0.94, 0.95, 0.97],
            color_b: [0.62, 0.66, 0.72],
            ratio: 0.5,
            opacity: 1.0,
            saturation: 0.0,
            lightness: 0.0,
            blur: 0.0,
            rotation: [0.0; 3],
        }
    }
}

impl BackgroundOptions {
    /// Check numeric ranges.
    pub fn validate(&self) -> Result<(), PostFxError> {
        check_range("background.ratio", self.ratio, 0.0, 1.0)?;
        check_range("background.opacity", self.opacity, 0.0, 1.0)?;
        check_range("background.saturation", self.saturation, -1.0, 1.0)?;
        check_range("background.lightness", self.lightness, -1.0, 1.0)?;
        check_range("background.blur", self.blur, 0.0, 1.0)?;
        for c in self.color_a.iter().chain(&self.color_b) {
            check_range("background.color", *c, 0.0, 1.0)?;
        }
        for r in self.rotation {
            check_range("background.rotation", r, -360.0, 360.0)?;
        }
        Ok(())
    }
}
