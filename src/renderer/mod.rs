//! Rendering subsystems.
//!
//! Contains the screen-space post-processing passes that run around an
//! external molecular scene renderer.

pub mod postprocess;
