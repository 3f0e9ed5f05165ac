//! Screen-space math shared by every pass.
//!
//! Clip space follows the OpenGL convention: NDC z lies in `[-1, 1]` and the
//! stored depth is `ndc_z * 0.5 + 0.5`. Screen UVs have their origin at the
//! bottom-left corner.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Depth value written where no geometry was rasterized.
pub const BACKGROUND_DEPTH: f32 = 1.0;

/// Whether `depth` is the far-plane sentinel (no geometry).
#[inline]
#[must_use]
pub fn is_background_depth(depth: f32) -> bool {
    depth == BACKGROUND_DEPTH
}

/// Convert a normalized depth value into linear view-space Z.
///
/// View-space Z is negative in front of the camera: depth 0 maps to
/// `-near` and depth 1 to `-far` for both projection types.
#[inline]
#[must_use]
pub fn depth_to_view_z(
    depth: f32,
    near: f32,
    far: f32,
    orthographic: bool,
) -> f32 {
    let depth = depth.clamp(0.0, 1.0);
    if orthographic {
        depth * (near - far) - near
    } else {
        // Denominator reaches zero only at depth = far / (far - near) > 1.
        (near * far) / ((far - near) * depth - far)
    }
}

/// Inverse of [`depth_to_view_z`].
#[inline]
#[must_use]
pub fn view_z_to_depth(
    view_z: f32,
    near: f32,
    far: f32,
    orthographic: bool,
) -> f32 {
    if orthographic {
        (view_z + near) / (near - far)
    } else {
        ((near + view_z) * far) / ((far - near) * view_z)
    }
}

/// Unproject a screen UV plus depth into view space.
#[inline]
#[must_use]
pub fn reconstruct_view_position(
    uv: Vec2,
    depth: f32,
    inverse_projection: &Mat4,
) -> Vec3 {
    let ndc = Vec4::new(uv.x, uv.y, depth, 1.0) * 2.0 - Vec4::ONE;
    let p = *inverse_projection * Vec4::new(ndc.x, ndc.y, ndc.z, 1.0);
    p.truncate() / p.w
}

/// Project a view-space position to `(uv, depth)` screen coordinates.
#[inline]
#[must_use]
pub fn project_to_screen(position: Vec3, projection: &Mat4) -> Vec3 {
    let clip = *projection * position.extend(1.0);
    (clip.truncate() / clip.w) * 0.5 + Vec3::splat(0.5)
}

/// Hermite interpolation between `edge0` and `edge1`, clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// `step(edge, x)`: 1 when `x >= edge`, else 0.
#[inline]
#[must_use]
pub fn step(edge: f32, x: f32) -> f32 {
    if x >= edge {
        1.0
    } else {
        0.0
    }
}
