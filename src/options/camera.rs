use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection parameters.
pub struct CameraOptions {
    /// Use an orthographic projection; selects the linear depth decoder.
    #[schemars(title = "Orthographic")]
    pub orthographic: bool,
    /// Vertical field of view in degrees (perspective only).
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Half of the visible height (orthographic only).
    #[schemars(skip)]
    pub ortho_half_height: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            orthographic: false,
            fovy: 45.0,
            ortho_half_height: 40.0,
            znear: 5.0,
            zfar: 2000.0,
        }
    }
}
