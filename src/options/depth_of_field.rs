use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{check_positive, check_range, PostFxError};

/// Circle-of-confusion formula.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DofMode {
    /// Distance from a focus plane perpendicular to the view axis.
    #[default]
    Planar,
    /// Distance from a focus point in view space.
    Spherical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Depth of Field", inline)]
#[serde(default)]
/// Depth-of-field parameters.
pub struct DepthOfFieldOptions {
    /// Run the pass.
    #[schemars(title = "Enabled")]
    pub enabled: bool,
    /// CoC formula.
    #[schemars(title = "Mode")]
    pub mode: DofMode,
    /// Tap spacing in texels.
    #[schemars(title = "Blur Spread", range(min = 0.0, max = 10.0), extend("step" = 0.1))]
    pub blur_spread: f32,
    /// Distance of the in-focus plane from the camera.
    #[schemars(title = "In Focus", range(min = 0.0, max = 500.0), extend("step" = 1.0))]
    pub in_focus: f32,
    /// Distance over which the CoC grows from 0 to 1.
    #[schemars(title = "Focus Falloff", range(min = 0.1, max = 200.0), extend("step" = 0.5))]
    pub pixels_per_millimeter: f32,
}

impl Default for DepthOfFieldOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: DofMode::Planar,
            blur_spread: 1.0,
            in_focus: 50.0,
            pixels_per_millimeter: 20.0,
        }
    }
}

impl DepthOfFieldOptions {
    /// Check numeric ranges.
    pub fn validate(&self) -> Result<(), PostFxError> {
        check_range("depth_of_field.blur_spread", self.blur_spread, 0.0, 10.0)?;
        check_range("depth_of_field.in_focus", self.in_focus, 0.0, f32::MAX)?;
        check_positive(
            "depth_of_field.pixels_per_millimeter",
            self.pixels_per_millimeter,
        )
    }
}
