//! Centralized post-processing options with TOML preset support.
//!
//! Every tweakable setting of the pass pipeline (background, depth of field,
//! shadows, antialiasing, camera, capabilities) lives here. Options
//! serialize to/from TOML for view presets stored in `assets/presets/`.

mod antialiasing;
mod background;
mod camera;
mod capabilities;
mod depth_of_field;
mod shadows;

use std::path::Path;

pub use antialiasing::AntialiasingOptions;
pub use background::{BackgroundOptions, BackgroundVariant};
pub use camera::CameraOptions;
pub use capabilities::CapabilityOptions;
pub use depth_of_field::{DepthOfFieldOptions, DofMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use shadows::{SamplingPattern, ShadowOptions, MAX_SHADOW_STEPS};

use crate::error::PostFxError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[shadows]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Background compositor.
    pub background: BackgroundOptions,
    /// Depth of field.
    pub depth_of_field: DepthOfFieldOptions,
    /// Screen-space shadows.
    pub shadows: ShadowOptions,
    /// Edge detection for antialiasing.
    pub antialiasing: AntialiasingOptions,
    /// Camera projection.
    pub camera: CameraOptions,
    /// Host capabilities; not user-facing.
    #[schemars(skip)]
    pub capabilities: CapabilityOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, PostFxError> {
        toml::from_str(content)
            .map_err(|e| PostFxError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, PostFxError> {
        let content = std::fs::read_to_string(path).map_err(PostFxError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), PostFxError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PostFxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PostFxError::Io)?;
        }
        std::fs::write(path, content).map_err(PostFxError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Check every numeric tunable. Camera planes are checked when the
    /// projection is built.
    pub fn validate(&self) -> Result<(), PostFxError> {
        self.background.validate()?;
        self.depth_of_field.validate()?;
        self.shadows.validate()?;
        self.antialiasing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[shadows]
enabled = true
sampling_pattern = "poisson_disk"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert!(opts.shadows.enabled);
        assert_eq!(opts.shadows.sampling_pattern, SamplingPattern::PoissonDisk);
        // Everything else should be default
        assert_eq!(opts.shadows.steps, 16);
        assert_eq!(opts.background, BackgroundOptions::default());
        assert_eq!(opts.depth_of_field.mode, DofMode::Planar);
    }

    #[test]
    fn unknown_variant_is_a_parse_error() {
        let toml_str = r#"
[background]
variant = "checkerboard"
"#;
        assert!(matches!(
            Options::from_toml(toml_str),
            Err(PostFxError::OptionsParse(_))
        ));
    }

    #[test]
    fn defaults_are_valid() {
        Options::default().validate().unwrap();
    }

    #[test]
    fn zero_steps_are_rejected() {
        let mut opts = Options::default();
        opts.shadows.steps = 0;
        assert!(matches!(
            opts.validate(),
            Err(PostFxError::InvalidParameter {
                name: "shadows.steps",
                ..
            })
        ));
    }

    #[test]
    fn shipped_presets_parse() {
        for preset in [
            include_str!("../../assets/presets/default.toml"),
            include_str!("../../assets/presets/cinematic.toml"),
            include_str!("../../assets/presets/print.toml"),
        ] {
            let opts = Options::from_toml(preset).unwrap();
            opts.validate().unwrap();
        }
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        // UI-exposed sections should be present
        assert!(props.contains_key("background"));
        assert!(props.contains_key("depth_of_field"));
        assert!(props.contains_key("shadows"));
        assert!(props.contains_key("antialiasing"));
        assert!(props.contains_key("camera"));

        // Host capabilities are not a UI concern
        assert!(!props.contains_key("capabilities"));

        // Background exposes sliders but not raw colors
        let background = &props["background"]["properties"];
        assert!(background.get("opacity").is_some());
        assert!(background.get("variant").is_some());
        assert!(background.get("color_a").is_none());
        assert!(background.get("rotation").is_none());
    }
}
