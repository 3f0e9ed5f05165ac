use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{check_range, PostFxError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Antialiasing", inline)]
#[serde(default)]
/// SMAA edge-detection parameters.
pub struct AntialiasingOptions {
    /// Run edge detection.
    #[schemars(title = "Enabled")]
    pub enabled: bool,
    /// Minimum color + luma delta treated as an edge.
    #[schemars(title = "Edge Threshold", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub edge_threshold: f32,
}

impl Default for AntialiasingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            edge_threshold: 0.1,
        }
    }
}

impl AntialiasingOptions {
    /// A zero threshold would flag flat regions as edges, so it must be
    /// positive.
    pub fn validate(&self) -> Result<(), PostFxError> {
        if self.edge_threshold <= 0.0 {
            return Err(PostFxError::InvalidParameter {
                name: "antialiasing.edge_threshold",
                reason: format!("{} must be positive", self.edge_threshold),
            });
        }
        check_range("antialiasing.edge_threshold", self.edge_threshold, 0.0, 2.0)
    }
}
