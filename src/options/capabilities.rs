use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
/// Render-target capabilities detected by the host, fixed for the lifetime
/// of a pipeline.
pub struct CapabilityOptions {
    /// Opaque depth is a native depth texture; otherwise it is RGBA-packed.
    pub native_depth_texture: bool,
    /// Explicit-LOD sampling is available for image and skybox blur.
    pub shader_texture_lod: bool,
}

impl Default for CapabilityOptions {
    fn default() -> Self {
        Self {
            native_depth_texture: true,
            shader_texture_lod: true,
        }
    }
}
