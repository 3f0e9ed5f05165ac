use glam::{Vec2, Vec3, Vec4};

use super::{ColorBuffer, TextureBuffer};
use crate::error::PostFxError;

/// A color texture with a box-filtered mip chain, sampled trilinearly.
#[derive(Debug, Clone, PartialEq)]
pub struct MipTexture {
    levels: Vec<ColorBuffer>,
}

impl MipTexture {
    /// Build the full mip chain (down to 1×1) from a base level.
    pub fn new(base: ColorBuffer) -> Result<Self, PostFxError> {
        if base.is_empty() {
            return Err(PostFxError::InvalidParameter {
                name: "texture",
                reason: "mip base level is empty".to_owned(),
            });
        }
        let mut levels = vec![base];
        while let Some(last) = levels.last() {
            if last.width() == 1 && last.height() == 1 {
                break;
            }
            let next = downsample(last);
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Number of levels including the base.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The full-resolution level.
    #[must_use]
    pub fn base(&self) -> &ColorBuffer {
        &self.levels[0]
    }

    /// Size of the base level.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.base().size()
    }

    /// Trilinear sample at `uv`; `lod` is clamped to the available levels.
    #[must_use]
    pub fn sample_lod(&self, uv: Vec2, lod: f32) -> Vec4 {
        let max_lod = (self.levels.len() - 1) as f32;
        let lod = lod.clamp(0.0, max_lod);
        let lo = lod.floor();
        let t = lod - lo;
        let a = self.levels[lo as usize].sample_linear(uv);
        if t <= 0.0 {
            return a;
        }
        let b = self.levels[(lo as usize + 1).min(self.levels.len() - 1)]
            .sample_linear(uv);
        a.lerp(b, t)
    }
}

fn downsample(src: &ColorBuffer) -> ColorBuffer {
    let w = (src.width() / 2).max(1);
    let h = (src.height() / 2).max(1);
    TextureBuffer::from_fn(w, h, |x, y| {
        let (sx, sy) = (i64::from(x) * 2, i64::from(y) * 2);
        (src.texel(sx, sy)
            + src.texel(sx + 1, sy)
            + src.texel(sx, sy + 1)
            + src.texel(sx + 1, sy + 1))
            * 0.25
    })
}

/// Cube map face order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACES: usize = 6;

/// An environment cube map with per-face mip chains.
///
/// Face texel row 0 corresponds to face coordinate `t = 0`, matching the
/// usual cube map upload order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMap {
    faces: [MipTexture; CUBE_FACES],
}

impl CubeMap {
    /// Build from six square faces of equal size.
    pub fn new(faces: [ColorBuffer; CUBE_FACES]) -> Result<Self, PostFxError> {
        let size = faces[0].size();
        if size.0 != size.1 {
            return Err(PostFxError::InvalidParameter {
                name: "skybox",
                reason: format!("faces must be square, got {}x{}", size.0, size.1),
            });
        }
        for face in &faces {
            face.check_size("skybox face", size)?;
        }
        let [px, nx, py, ny, pz, nz] = faces;
        Ok(Self {
            faces: [
                MipTexture::new(px)?,
                MipTexture::new(nx)?,
                MipTexture::new(py)?,
                MipTexture::new(ny)?,
                MipTexture::new(pz)?,
                MipTexture::new(nz)?,
            ],
        })
    }

    /// Build a cube map by evaluating `f(direction)` at every face texel.
    pub fn from_fn(
        size: u32,
        f: impl Fn(Vec3) -> Vec4,
    ) -> Result<Self, PostFxError> {
        let faces: [ColorBuffer; CUBE_FACES] = std::array::from_fn(|face| {
            TextureBuffer::from_fn(size, size, |x, y| {
                let sc = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let tc = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                f(face_direction(face, sc, tc).normalize())
            })
        });
        Self::new(faces)
    }

    /// Sample along `direction` (need not be normalized) at `lod`.
    #[must_use]
    pub fn sample(&self, direction: Vec3, lod: f32) -> Vec4 {
        let (face, uv) = select_face(direction);
        self.faces[face].sample_lod(uv, lod)
    }
}

fn face_direction(face: usize, sc: f32, tc: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -tc, -sc),
        1 => Vec3::new(-1.0, -tc, sc),
        2 => Vec3::new(sc, 1.0, tc),
        3 => Vec3::new(sc, -1.0, -tc),
        4 => Vec3::new(sc, -tc, 1.0),
        _ => Vec3::new(-sc, -tc, -1.0),
    }
}

/// Major-axis face selection; returns the face index and its UV.
fn select_face(d: Vec3) -> (usize, Vec2) {
    let a = d.abs();
    let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
        if d.x >= 0.0 {
            (0, -d.z, -d.y, a.x)
        } else {
            (1, d.z, -d.y, a.x)
        }
    } else if a.y >= a.z {
        if d.y >= 0.0 {
            (2, d.x, d.z, a.y)
        } else {
            (3, d.x, -d.z, a.y)
        }
    } else if d.z >= 0.0 {
        (4, d.x, -d.y, a.z)
    } else {
        (5, -d.x, -d.y, a.z)
    };
    let ma = ma.max(f32::MIN_POSITIVE);
    (face, Vec2::new(sc / ma + 1.0, tc / ma + 1.0) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_reaches_one_texel() {
        let tex = MipTexture::new(TextureBuffer::new(8, 4, Vec4::ONE)).unwrap();
        assert_eq!(tex.level_count(), 4);
    }

    #[test]
    fn top_level_is_the_average() {
        let base = TextureBuffer::from_fn(4, 4, |x, _| {
            if x < 2 {
                Vec4::ZERO
            } else {
                Vec4::ONE
            }
        });
        let tex = MipTexture::new(base).unwrap();
        let avg = tex.sample_lod(Vec2::splat(0.5), 100.0);
        assert!((avg - Vec4::splat(0.5)).abs().max_element() < 1e-6);
        // LOD 0 keeps detail.
        assert_eq!(tex.sample_lod(Vec2::new(0.1, 0.5), 0.0), Vec4::ZERO);
    }

    #[test]
    fn face_mapping_round_trips() {
        for face in 0..CUBE_FACES {
            for (sc, tc) in [(0.3, -0.4), (-0.9, 0.9), (0.0, 0.0)] {
                let dir = face_direction(face, sc, tc);
                let (f, uv) = select_face(dir);
                assert_eq!(f, face);
                assert!((uv.x - (sc + 1.0) * 0.5).abs() < 1e-6);
                assert!((uv.y - (tc + 1.0) * 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn procedural_cube_samples_by_direction() {
        let cube = CubeMap::from_fn(8, |d| d.extend(1.0)).unwrap();
        let up = cube.sample(Vec3::Y, 0.0);
        assert!(up.y > 0.9, "{up:?}");
        let back = cube.sample(-Vec3::Z * 5.0, 0.0);
        assert!(back.z < -0.9, "{back:?}");
    }
}
