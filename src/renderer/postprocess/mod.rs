//! Post-processing effect passes.
//!
//! Provides the background compositor, screen-space shadows, depth of
//! field, and SMAA edge detection, sequenced by [`PostProcessStack`].

/// Skybox, image, and gradient backgrounds.
pub mod background;
/// Circle-of-confusion blur.
pub mod depth_of_field;
/// SMAA color edge detection.
pub mod edges;
/// Pass sequencing and the per-frame contract.
pub mod post_process;
/// The fullscreen pass trait.
pub mod screen_pass;
/// Screen-space shadow ray marching.
pub mod shadows;
/// Setup-time variant resolution and shader definitions.
pub mod variants;

pub use post_process::{FrameContext, FrameOutput, PostProcessStack, SceneRenderer};
pub use screen_pass::ScreenPass;
pub use variants::PassVariants;
