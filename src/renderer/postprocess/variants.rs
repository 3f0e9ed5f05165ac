//! Setup-time selection of each pass's algorithm branch.
//!
//! Every branch a pass can take (background style, CoC formula, march
//! pattern, depth decoder) is resolved once into [`PassVariants`] when the
//! pipeline is configured. Passes dispatch on these enums instead of
//! re-reading options per pixel.
//!
//! The same selection can be exported as shader definitions for a GPU
//! backend composing WGSL with `naga_oil`, and parsed back from such a map.
//! Parsing is where missing, conflicting, or unknown flags are rejected.

use std::collections::HashMap;

use naga_oil::compose::ShaderDefValue;

use super::background::BackgroundAssets;
use crate::error::PostFxError;
use crate::lighting::MAX_SHADOW_LIGHTS;
use crate::options::{
    BackgroundVariant, DofMode, Options, SamplingPattern, MAX_SHADOW_STEPS,
};
use crate::texture::depth::DepthEncoding;

/// Shader definition names understood by [`PassVariants::from_shader_defs`].
pub mod defs {
    /// Background pass enabled.
    pub const BACKGROUND_ENABLED: &str = "BACKGROUND_ENABLED";
    /// Skybox background branch.
    pub const BACKGROUND_SKYBOX: &str = "BACKGROUND_SKYBOX";
    /// Image background branch.
    pub const BACKGROUND_IMAGE: &str = "BACKGROUND_IMAGE";
    /// Horizontal gradient background branch.
    pub const BACKGROUND_HORIZONTAL_GRADIENT: &str =
        "BACKGROUND_HORIZONTAL_GRADIENT";
    /// Radial gradient background branch.
    pub const BACKGROUND_RADIAL_GRADIENT: &str = "BACKGROUND_RADIAL_GRADIENT";
    /// Depth-of-field pass enabled.
    pub const DOF_ENABLED: &str = "DOF_ENABLED";
    /// Spherical CoC (planar when false).
    pub const DOF_SPHERICAL: &str = "DOF_SPHERICAL";
    /// Shadow pass enabled.
    pub const SHADOWS_ENABLED: &str = "SHADOWS_ENABLED";
    /// Sampling pattern: 0 uniform, 1 Poisson disk, 2 jittered.
    pub const SHADOW_SAMPLING: &str = "SHADOW_SAMPLING";
    /// Ray-march steps per light.
    pub const SHADOW_STEPS: &str = "SHADOW_STEPS";
    /// Capacity of the light arrays.
    pub const SHADOW_MAX_LIGHTS: &str = "SHADOW_MAX_LIGHTS";
    /// Edge detection enabled.
    pub const EDGES_ENABLED: &str = "EDGES_ENABLED";
    /// Linear (orthographic) depth decoding.
    pub const ORTHOGRAPHIC: &str = "ORTHOGRAPHIC";
    /// Opaque depth is a native depth texture.
    pub const NATIVE_DEPTH_TEXTURE: &str = "NATIVE_DEPTH_TEXTURE";
    /// Explicit-LOD texture sampling available.
    pub const TEXTURE_LOD: &str = "TEXTURE_LOD";
}

/// Shadow march configuration fixed at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowVariant {
    /// Step offset pattern.
    pub pattern: SamplingPattern,
    /// Steps per light.
    pub steps: u32,
}

/// The resolved branch of every pass. `None` means the pass is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassVariants {
    /// Background branch.
    pub background: Option<BackgroundVariant>,
    /// CoC formula.
    pub depth_of_field: Option<DofMode>,
    /// Shadow march.
    pub shadows: Option<ShadowVariant>,
    /// Edge detection on/off.
    pub edges: bool,
    /// Depth decoding uses the orthographic (linear) formula.
    pub orthographic: bool,
    /// Encoding of the opaque depth buffer.
    pub depth_encoding: DepthEncoding,
    /// Image/skybox sampling may use explicit LOD.
    pub texture_lod: bool,
}

impl PassVariants {
    /// Resolve from options, checking numeric ranges and that the chosen
    /// background has its asset attached.
    pub fn resolve(
        options: &Options,
        assets: &BackgroundAssets,
    ) -> Result<Self, PostFxError> {
        options.validate()?;

        let background = if options.background.enabled {
            let variant = options.background.variant;
            match variant {
                BackgroundVariant::Skybox if assets.skybox.is_none() => {
                    return Err(PostFxError::MissingAsset("skybox cube map"));
                }
                BackgroundVariant::Image if assets.image.is_none() => {
                    return Err(PostFxError::MissingAsset("background image"));
                }
                _ => {}
            }
            Some(variant)
        } else {
            None
        };

        let variants = Self {
            background,
            depth_of_field: options
                .depth_of_field
                .enabled
                .then_some(options.depth_of_field.mode),
            shadows: options.shadows.enabled.then_some(ShadowVariant {
                pattern: options.shadows.sampling_pattern,
                steps: options.shadows.steps,
            }),
            edges: options.antialiasing.enabled,
            orthographic: options.camera.orthographic,
            depth_encoding: if options.capabilities.native_depth_texture {
                DepthEncoding::Native
            } else {
                DepthEncoding::Packed
            },
            texture_lod: options.capabilities.shader_texture_lod,
        };
        log::debug!("resolved pass variants: {variants:?}");
        Ok(variants)
    }

    /// Export as shader definitions.
    #[must_use]
    pub fn shader_defs(&self) -> HashMap<String, ShaderDefValue> {
        let mut out = HashMap::new();
        let mut set = |name: &str, value: ShaderDefValue| {
            let _ = out.insert(name.to_owned(), value);
        };

        set(defs::BACKGROUND_ENABLED, ShaderDefValue::Bool(self.background.is_some()));
        if let Some(variant) = self.background {
            set(background_flag(variant), ShaderDefValue::Bool(true));
        }

        set(defs::DOF_ENABLED, ShaderDefValue::Bool(self.depth_of_field.is_some()));
        if let Some(mode) = self.depth_of_field {
            set(
                defs::DOF_SPHERICAL,
                ShaderDefValue::Bool(mode == DofMode::Spherical),
            );
        }

        set(defs::SHADOWS_ENABLED, ShaderDefValue::Bool(self.shadows.is_some()));
        if let Some(shadow) = self.shadows {
            set(
                defs::SHADOW_SAMPLING,
                ShaderDefValue::UInt(sampling_index(shadow.pattern)),
            );
            set(defs::SHADOW_STEPS, ShaderDefValue::UInt(shadow.steps));
            set(
                defs::SHADOW_MAX_LIGHTS,
                ShaderDefValue::UInt(MAX_SHADOW_LIGHTS as u32),
            );
        }

        set(defs::EDGES_ENABLED, ShaderDefValue::Bool(self.edges));
        set(defs::ORTHOGRAPHIC, ShaderDefValue::Bool(self.orthographic));
        set(
            defs::NATIVE_DEPTH_TEXTURE,
            ShaderDefValue::Bool(self.depth_encoding == DepthEncoding::Native),
        );
        set(defs::TEXTURE_LOD, ShaderDefValue::Bool(self.texture_lod));
        out
    }

    /// Parse externally supplied shader definitions.
    ///
    /// Absent boolean flags read as false. An enabled background needs
    /// exactly one variant flag; an enabled shadow pass needs a known
    /// sampling pattern and an in-range step count.
    pub fn from_shader_defs(
        defs_map: &HashMap<String, ShaderDefValue>,
    ) -> Result<Self, PostFxError> {
        let flag = |name: &str| read_flag(defs_map, name);

        let background = if flag(defs::BACKGROUND_ENABLED)? {
            let mut selected = Vec::new();
            for variant in [
                BackgroundVariant::Skybox,
                BackgroundVariant::Image,
                BackgroundVariant::HorizontalGradient,
                BackgroundVariant::RadialGradient,
            ] {
                if flag(background_flag(variant))? {
                    selected.push(variant);
                }
            }
            match selected.as_slice() {
                [] => return Err(PostFxError::MissingVariant("background")),
                [one] => Some(*one),
                many => {
                    let names: Vec<&str> =
                        many.iter().map(|v| background_flag(*v)).collect();
                    return Err(PostFxError::ConflictingVariants(
                        names.join(", "),
                    ));
                }
            }
        } else {
            None
        };

        let depth_of_field = if flag(defs::DOF_ENABLED)? {
            Some(if flag(defs::DOF_SPHERICAL)? {
                DofMode::Spherical
            } else {
                DofMode::Planar
            })
        } else {
            None
        };

        let shadows = if flag(defs::SHADOWS_ENABLED)? {
            let pattern = match read_uint(defs_map, defs::SHADOW_SAMPLING)? {
                None => return Err(PostFxError::MissingVariant("shadows")),
                Some(0) => SamplingPattern::Uniform,
                Some(1) => SamplingPattern::PoissonDisk,
                Some(2) => SamplingPattern::Jittered,
                Some(other) => {
                    return Err(PostFxError::UnknownVariant {
                        flag: defs::SHADOW_SAMPLING.to_owned(),
                        value: other.to_string(),
                    })
                }
            };
            let steps = read_uint(defs_map, defs::SHADOW_STEPS)?
                .ok_or(PostFxError::MissingVariant("shadow steps"))?;
            if steps == 0 || steps > MAX_SHADOW_STEPS {
                return Err(PostFxError::InvalidParameter {
                    name: "shadows.steps",
                    reason: format!("{steps} is outside [1, {MAX_SHADOW_STEPS}]"),
                });
            }
            Some(ShadowVariant { pattern, steps })
        } else {
            None
        };

        Ok(Self {
            background,
            depth_of_field,
            shadows,
            edges: flag(defs::EDGES_ENABLED)?,
            orthographic: flag(defs::ORTHOGRAPHIC)?,
            depth_encoding: if flag(defs::NATIVE_DEPTH_TEXTURE)? {
                DepthEncoding::Native
            } else {
                DepthEncoding::Packed
            },
            texture_lod: flag(defs::TEXTURE_LOD)?,
        })
    }
}

fn background_flag(variant: BackgroundVariant) -> &'static str {
    match variant {
        BackgroundVariant::Skybox => defs::BACKGROUND_SKYBOX,
        BackgroundVariant::Image => defs::BACKGROUND_IMAGE,
        BackgroundVariant::HorizontalGradient => {
            defs::BACKGROUND_HORIZONTAL_GRADIENT
        }
        BackgroundVariant::RadialGradient => defs::BACKGROUND_RADIAL_GRADIENT,
    }
}

/// Index used for the sampling pattern in shader defs and uniforms.
pub(crate) fn sampling_index(pattern: SamplingPattern) -> u32 {
    match pattern {
        SamplingPattern::Uniform => 0,
        SamplingPattern::PoissonDisk => 1,
        SamplingPattern::Jittered => 2,
    }
}

fn read_flag(
    defs_map: &HashMap<String, ShaderDefValue>,
    name: &str,
) -> Result<bool, PostFxError> {
    match defs_map.get(name) {
        None => Ok(false),
        Some(ShaderDefValue::Bool(b)) => Ok(*b),
        Some(other) => Err(PostFxError::UnknownVariant {
            flag: name.to_owned(),
            value: format!("{other:?}"),
        }),
    }
}

fn read_uint(
    defs_map: &HashMap<String, ShaderDefValue>,
    name: &str,
) -> Result<Option<u32>, PostFxError> {
    match defs_map.get(name) {
        None => Ok(None),
        Some(ShaderDefValue::UInt(v)) => Ok(Some(*v)),
        Some(ShaderDefValue::Int(v)) if *v >= 0 => Ok(Some(*v as u32)),
        Some(other) => Err(PostFxError::UnknownVariant {
            flag: name.to_owned(),
            value: format!("{other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_defs() -> HashMap<String, ShaderDefValue> {
        let mut map = HashMap::new();
        let _ = map.insert(
            defs::BACKGROUND_ENABLED.to_owned(),
            ShaderDefValue::Bool(true),
        );
        let _ = map.insert(
            defs::BACKGROUND_RADIAL_GRADIENT.to_owned(),
            ShaderDefValue::Bool(true),
        );
        map
    }

    #[test]
    fn resolve_follows_options() {
        let mut opts = Options::default();
        opts.shadows.enabled = true;
        opts.shadows.sampling_pattern = SamplingPattern::Jittered;
        opts.capabilities.native_depth_texture = false;
        opts.camera.orthographic = true;
        let v = PassVariants::resolve(&opts, &BackgroundAssets::default())
            .unwrap();
        assert_eq!(v.background, Some(BackgroundVariant::HorizontalGradient));
        assert_eq!(v.depth_of_field, None);
        assert_eq!(
            v.shadows,
            Some(ShadowVariant {
                pattern: SamplingPattern::Jittered,
                steps: 16
            })
        );
        assert_eq!(v.depth_encoding, DepthEncoding::Packed);
        assert!(v.orthographic);
    }

    #[test]
    fn image_variant_without_asset_fails_fast() {
        let mut opts = Options::default();
        opts.background.variant = BackgroundVariant::Image;
        assert!(matches!(
            PassVariants::resolve(&opts, &BackgroundAssets::default()),
            Err(PostFxError::MissingAsset(_))
        ));
        // A disabled background does not need its asset.
        opts.background.enabled = false;
        assert!(PassVariants::resolve(&opts, &BackgroundAssets::default())
            .is_ok());
    }

    #[test]
    fn exported_defs_parse_back() {
        let mut opts = Options::default();
        opts.depth_of_field.enabled = true;
        opts.depth_of_field.mode = DofMode::Spherical;
        opts.shadows.enabled = true;
        opts.shadows.sampling_pattern = SamplingPattern::PoissonDisk;
        let v = PassVariants::resolve(&opts, &BackgroundAssets::default())
            .unwrap();
        let parsed = PassVariants::from_shader_defs(&v.shader_defs()).unwrap();
        assert_eq!(parsed, v);
    }

    #[test]
    fn conflicting_background_flags_are_rejected() {
        let mut map = gradient_defs();
        let _ = map.insert(
            defs::BACKGROUND_SKYBOX.to_owned(),
            ShaderDefValue::Bool(true),
        );
        match PassVariants::from_shader_defs(&map) {
            Err(PostFxError::ConflictingVariants(names)) => {
                assert!(names.contains(defs::BACKGROUND_SKYBOX));
                assert!(names.contains(defs::BACKGROUND_RADIAL_GRADIENT));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn omitted_background_flag_is_rejected() {
        let mut map = gradient_defs();
        let _ = map.remove(defs::BACKGROUND_RADIAL_GRADIENT);
        assert!(matches!(
            PassVariants::from_shader_defs(&map),
            Err(PostFxError::MissingVariant("background"))
        ));
    }

    #[test]
    fn unknown_sampling_pattern_is_rejected() {
        let mut map = gradient_defs();
        let _ = map.insert(
            defs::SHADOWS_ENABLED.to_owned(),
            ShaderDefValue::Bool(true),
        );
        let _ = map.insert(
            defs::SHADOW_SAMPLING.to_owned(),
            ShaderDefValue::UInt(7),
        );
        let _ = map.insert(
            defs::SHADOW_STEPS.to_owned(),
            ShaderDefValue::UInt(8),
        );
        assert!(matches!(
            PassVariants::from_shader_defs(&map),
            Err(PostFxError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut map = gradient_defs();
        let _ = map.insert(
            defs::ORTHOGRAPHIC.to_owned(),
            ShaderDefValue::UInt(1),
        );
        assert!(PassVariants::from_shader_defs(&map).is_err());
    }
}
