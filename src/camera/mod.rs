//! Per-frame camera and viewport inputs.
//!
//! Both are supplied fresh each frame by the external renderer and are
//! immutable while the passes run.

/// Projection matrices and clip planes.
pub mod projection;
/// Viewport rectangle and screen-coordinate remapping.
pub mod viewport;

pub use projection::CameraProjection;
pub use viewport::Viewport;
