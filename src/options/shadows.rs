use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{check_positive, check_range, PostFxError};

/// Upper bound on ray-march steps per light.
pub const MAX_SHADOW_STEPS: u32 = 64;

/// How successive ray-march steps are offset.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPattern {
    /// Straight steps toward the light.
    #[default]
    Uniform,
    /// Golden-angle spiral lateral offsets.
    PoissonDisk,
    /// Hash-based per-step jitter.
    Jittered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Shadows", inline)]
#[serde(default)]
/// Screen-space shadow parameters.
pub struct ShadowOptions {
    /// Run the pass.
    #[schemars(title = "Enabled")]
    pub enabled: bool,
    /// Step offset pattern.
    #[schemars(title = "Sampling")]
    pub sampling_pattern: SamplingPattern,
    /// March length in view-space units.
    #[schemars(title = "Max Distance", range(min = 0.1, max = 32.0), extend("step" = 0.1))]
    pub max_distance: f32,
    /// Steps per light.
    #[schemars(title = "Steps", range(min = 1, max = 64))]
    pub steps: u32,
    /// Depth difference below which a step counts as occluded.
    #[schemars(title = "Tolerance", range(min = 0.0, max = 10.0), extend("step" = 0.01))]
    pub tolerance: f32,
    /// Shadow strength; output is `1 - bias` where fully occluded.
    #[schemars(title = "Strength", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub bias: f32,
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            sampling_pattern: SamplingPattern::Uniform,
            max_distance: 3.0,
            steps: 16,
            tolerance: 0.01,
            bias: 0.6,
        }
    }
}

impl ShadowOptions {
    /// Check numeric ranges.
    pub fn validate(&self) -> Result<(), PostFxError> {
        check_positive("shadows.max_distance", self.max_distance)?;
        if self.steps == 0 || self.steps > MAX_SHADOW_STEPS {
            return Err(PostFxError::InvalidParameter {
                name: "shadows.steps",
                reason: format!(
                    "{} is outside [1, {MAX_SHADOW_STEPS}]",
                    self.steps
                ),
            });
        }
        check_range("shadows.tolerance", self.tolerance, -10.0, 10.0)?;
        check_range("shadows.bias", self.bias, 0.0, 1.0)
    }
}
