//! Color and noise helpers used by the background and edge passes.

use glam::{Vec2, Vec3};

/// Rec. 601 luma weights used for edge detection.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// Relative-luminance weights used for saturation adjustment.
pub const RELATIVE_LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.2125, 0.7154, 0.0721);

/// Perceptual luminance of a linear RGB color.
#[inline]
#[must_use]
pub fn luminance(color: Vec3) -> f32 {
    color.dot(LUMA_WEIGHTS)
}

/// Push `color` away from (positive `amount`) or toward (negative) its
/// grey-level intensity. `amount = -1` yields full greyscale.
#[inline]
#[must_use]
pub fn saturate_color(color: Vec3, amount: f32) -> Vec3 {
    let intensity = Vec3::splat(color.dot(RELATIVE_LUMINANCE_WEIGHTS));
    intensity.lerp(color, 1.0 + amount)
}

/// Additive lightness shift.
#[inline]
#[must_use]
pub fn lighten_color(color: Vec3, amount: f32) -> Vec3 {
    color + amount
}

/// Low-amplitude ordered noise that breaks up gradient banding.
///
/// Each channel lies in `[-0.5, 0.5] * 0.375 / 255`. `frame_time` shifts
/// the pattern between frames.
#[inline]
#[must_use]
pub fn screen_space_dither(frag_coord: Vec2, frame_time: f32) -> Vec3 {
    let d = Vec2::new(171.0, 231.0).dot(frag_coord + Vec2::splat(frame_time));
    let q = Vec3::splat(d) / Vec3::new(103.0, 71.0, 97.0);
    let v = q - q.floor() - Vec3::splat(0.5);
    (v / 255.0) * 0.375
}

/// Deterministic pseudo-random value in `[0, 1)` from a 2D seed.
#[inline]
#[must_use]
pub fn hash_random(co: Vec2) -> f32 {
    let s = co.dot(Vec2::new(12.9898, 78.233)).sin() * 43_758.547;
    s - s.floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dither_amplitude_is_bounded() {
        let bound = 0.5 * 0.375 / 255.0 + 1e-7;
        for y in 0..16 {
            for x in 0..16 {
                let d = screen_space_dither(
                    Vec2::new(x as f32 + 0.5, y as f32 + 0.5),
                    3.25,
                );
                assert!(d.abs().max_element() <= bound, "{d:?}");
            }
        }
    }

    #[test]
    fn dither_changes_with_frame_time() {
        let p = Vec2::new(10.5, 20.5);
        assert_ne!(screen_space_dither(p, 0.0), screen_space_dither(p, 1.3));
    }

    #[test]
    fn full_desaturation_is_grey() {
        let c = saturate_color(Vec3::new(1.0, 0.0, 0.0), -1.0);
        assert!((c.x - c.y).abs() < 1e-6 && (c.y - c.z).abs() < 1e-6);
        assert!((c.x - 0.2125).abs() < 1e-6);
        assert_eq!(saturate_color(Vec3::ONE * 0.3, 0.0), Vec3::ONE * 0.3);
    }

    #[test]
    fn hash_random_is_deterministic_unit_interval() {
        for i in 0..64 {
            let a = hash_random(Vec2::new(i as f32, 0.0));
            assert_eq!(a, hash_random(Vec2::new(i as f32, 0.0)));
            assert!((0.0..=1.0).contains(&a));
        }
    }

    #[test]
    fn white_has_unit_luminance() {
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-6);
    }
}
