use glam::{Mat4, Vec4};

use crate::error::PostFxError;
use crate::options::CameraOptions;

/// Tolerance for `projection * inverse ≈ identity`.
const INVERSE_TOLERANCE: f32 = 1e-3;

/// Camera projection for one frame.
///
/// Matrices use OpenGL clip-space conventions (`perspective_rh_gl`,
/// `orthographic_rh_gl`): NDC z in `[-1, 1]`, stored depth
/// `ndc_z * 0.5 + 0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjection {
    near: f32,
    far: f32,
    projection: Mat4,
    inverse_projection: Mat4,
    view: Mat4,
    orthographic: bool,
}

impl CameraProjection {
    /// Perspective projection from a vertical field of view in radians.
    pub fn perspective(
        fovy: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, PostFxError> {
        validate_planes(near, far, false)?;
        if !(fovy > 0.0 && fovy < std::f32::consts::PI) || !(aspect > 0.0) {
            return Err(PostFxError::InvalidCamera(format!(
                "fovy {fovy} / aspect {aspect} out of range"
            )));
        }
        Self::from_matrices(
            Mat4::perspective_rh_gl(fovy, aspect, near, far),
            near,
            far,
            false,
        )
    }

    /// Orthographic projection spanning `±half_height` vertically.
    pub fn orthographic(
        half_height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, PostFxError> {
        validate_planes(near, far, true)?;
        if !(half_height > 0.0) || !(aspect > 0.0) {
            return Err(PostFxError::InvalidCamera(format!(
                "half height {half_height} / aspect {aspect} out of range"
            )));
        }
        let hw = half_height * aspect;
        Self::from_matrices(
            Mat4::orthographic_rh_gl(
                -hw,
                hw,
                -half_height,
                half_height,
                near,
                far,
            ),
            near,
            far,
            true,
        )
    }

    /// Wrap an externally built projection, deriving and checking its
    /// inverse.
    pub fn from_matrices(
        projection: Mat4,
        near: f32,
        far: f32,
        orthographic: bool,
    ) -> Result<Self, PostFxError> {
        validate_planes(near, far, orthographic)?;
        let det = projection.determinant();
        if !det.is_finite() || det.abs() <= f32::EPSILON * f32::EPSILON {
            return Err(PostFxError::InvalidCamera(
                "projection matrix is not invertible".to_owned(),
            ));
        }
        let inverse_projection = projection.inverse();
        if !(projection * inverse_projection)
            .abs_diff_eq(Mat4::IDENTITY, INVERSE_TOLERANCE)
        {
            return Err(PostFxError::InvalidCamera(
                "projection and inverse disagree".to_owned(),
            ));
        }
        Ok(Self {
            near,
            far,
            projection,
            inverse_projection,
            view: Mat4::IDENTITY,
            orthographic,
        })
    }

    /// Build from the camera options section for a target aspect ratio.
    pub fn from_options(
        options: &CameraOptions,
        aspect: f32,
    ) -> Result<Self, PostFxError> {
        if options.orthographic {
            Self::orthographic(
                options.ortho_half_height,
                aspect,
                options.znear,
                options.zfar,
            )
        } else {
            Self::perspective(
                options.fovy.to_radians(),
                aspect,
                options.znear,
                options.zfar,
            )
        }
    }

    /// Attach the world-to-view matrix (used by the skybox background).
    #[must_use]
    pub fn with_view(mut self, view: Mat4) -> Self {
        self.view = view;
        self
    }

    /// Near clip plane distance.
    #[must_use]
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far clip plane distance.
    #[must_use]
    pub fn far(&self) -> f32 {
        self.far
    }

    /// View-to-clip matrix.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Clip-to-view matrix.
    #[must_use]
    pub fn inverse_projection(&self) -> Mat4 {
        self.inverse_projection
    }

    /// World-to-view matrix.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Whether depth is linear (orthographic) rather than hyperbolic.
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        self.orthographic
    }

    /// Inverse of projection times the rotation-only view, mapping clip
    /// positions to world-space view directions.
    #[must_use]
    pub fn view_direction_projection_inverse(&self) -> Mat4 {
        let mut rotation = self.view;
        rotation.w_axis = Vec4::W;
        (self.projection * rotation).inverse()
    }
}

fn validate_planes(
    near: f32,
    far: f32,
    orthographic: bool,
) -> Result<(), PostFxError> {
    if !near.is_finite() || !far.is_finite() || near >= far {
        return Err(PostFxError::InvalidCamera(format!(
            "near {near} must be less than far {far}"
        )));
    }
    if !orthographic && near <= 0.0 {
        return Err(PostFxError::InvalidCamera(format!(
            "perspective near plane must be positive, got {near}"
        )));
    }
    Ok(())
}
