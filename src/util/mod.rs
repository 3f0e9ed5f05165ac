//! Shared utilities for the post-processing passes.
//!
//! Screen-space math (depth decoding, view reconstruction), color and noise
//! helpers, frame timing, and hashing for derived-state caches.

/// Luminance, saturation, dither, and hash noise.
pub mod color;
/// Frame and per-pass timing.
pub mod frame_timing;
/// Change-detection digests for camera/viewport state.
pub mod hash;
/// Depth decoding and view-space reconstruction.
pub mod screen_space;
