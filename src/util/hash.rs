use std::hash::{Hash, Hasher};

use glam::{Mat4, Vec4};

/// Hash a single [`Vec4`] by converting each component to bits.
pub fn hash_vec4(v: &Vec4, hasher: &mut impl Hasher) {
    for c in v.to_array() {
        c.to_bits().hash(hasher);
    }
}

/// Hash every component of a [`Mat4`].
pub fn hash_mat4(m: &Mat4, hasher: &mut impl Hasher) {
    for c in m.to_cols_array() {
        c.to_bits().hash(hasher);
    }
}

/// Digest of a set of matrices plus extra vectors, used to detect camera or
/// viewport changes between frames.
pub fn hash_frame_state(matrices: &[Mat4], vectors: &[Vec4]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    matrices.len().hash(&mut hasher);
    for m in matrices {
        hash_mat4(m, &mut hasher);
    }
    for v in vectors {
        hash_vec4(v, &mut hasher);
    }
    hasher.finish()
}
