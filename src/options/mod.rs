//! Tweakable scene settings with TOML preset support.
//!
//! Camera, display, loading, layout, interaction, keybinding and debug
//! settings live here. Options serialize to/from TOML so a run can be
//! reproduced from a preset file in `assets/presets/`.

mod camera;
mod debug;
mod display;
mod interaction;
mod keybindings;
mod layout;
mod loading;

use std::path::Path;

pub use camera::CameraOptions;
pub use debug::DebugOptions;
pub use display::DisplayOptions;
pub use interaction::InteractionOptions;
pub use keybindings::KeybindingOptions;
pub use layout::{AngleMode, LayoutOptions};
pub use loading::LoadingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::OrreryError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct Options {
    /// Camera projection and orbit-control parameters.
    pub camera: CameraOptions,
    /// Resolution, backdrop and lighting parameters.
    pub display: DisplayOptions,
    /// Asset loading parameters.
    pub loading: LoadingOptions,
    /// Procedural placement parameters.
    pub layout: LayoutOptions,
    /// Hover and click behaviour.
    pub interaction: InteractionOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
    /// Diagnostic logging toggles.
    pub debug: DebugOptions,
}

impl Options {
    /// Generate JSON Schema describing the user-facing options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, OrreryError> {
        let mut opts: Self = toml::from_str(content)
            .map_err(|e| OrreryError::OptionsParse(e.to_string()))?;
        opts.keybindings.rebuild_reverse_map();
        Ok(opts)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, OrreryError> {
        let content = std::fs::read_to_string(path).map_err(OrreryError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), OrreryError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| OrreryError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(OrreryError::Io)?;
        }
        std::fs::write(path, content).map_err(OrreryError::Io)
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

    /// Overwrite a single `section.field` value.
    ///
    /// The update goes through a JSON round-trip so the value is checked
    /// against the field's type. On error `self` is left untouched.
    pub fn set_field(
        &mut self,
        section: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), OrreryError> {
        let mut root = serde_json::to_value(&*self)
            .map_err(|e| OrreryError::OptionsParse(e.to_string()))?;
        let slot = root
            .get_mut(section)
            .and_then(|s| s.get_mut(field))
            .ok_or_else(|| {
                OrreryError::OptionsParse(format!(
                    "unknown option {section}.{field}"
                ))
            })?;
        *slot = value;
        let mut updated: Self = serde_json::from_value(root)
            .map_err(|e| OrreryError::OptionsParse(e.to_string()))?;
        updated.keybindings.rebuild_reverse_map();
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[loading]
settle_delay_ms = 250
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.loading.settle_delay_ms, 250);
        assert_eq!(opts.loading.load_timeout_ms, 30_000);
        assert_eq!(opts.camera.fovy, 90.0);
        assert_eq!(opts.display.max_pixel_ratio, 2.0);
        assert_eq!(opts.layout.angle_mode, AngleMode::Legacy);
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("Escape"),
            Some(KeyAction::DismissOverlay)
        );
        assert_eq!(opts.keybindings.lookup("KeyR"), Some(KeyAction::ResetCamera));
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn loaded_keybindings_are_searchable() {
        let toml_str = r#"
[keybindings.bindings]
reset_camera = "Home"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.keybindings.lookup("Home"), Some(KeyAction::ResetCamera));
        assert_eq!(opts.keybindings.lookup("KeyR"), None);
    }

    #[test]
    fn layout_seed_and_mode_parse() {
        let toml_str = r#"
[layout]
seed = 42
angle_mode = "uniform"
"#;
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.layout.seed, Some(42));
        assert_eq!(opts.layout.angle_mode, AngleMode::Uniform);
    }

    #[test]
    fn set_field_updates_one_value() {
        let mut opts = Options::default();
        opts.set_field("camera", "fovy", serde_json::json!(60.0))
            .unwrap();
        assert_eq!(opts.camera.fovy, 60.0);
        assert_eq!(opts.camera.zfar, 250.0);
    }

    #[test]
    fn set_field_rejects_unknown_and_mistyped() {
        let mut opts = Options::default();
        assert!(opts
            .set_field("camera", "nope", serde_json::json!(1.0))
            .is_err());
        assert!(opts
            .set_field("camera", "fovy", serde_json::json!("wide"))
            .is_err());
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("display"));
        assert!(props.contains_key("loading"));
        assert!(props.contains_key("interaction"));
        assert!(props.contains_key("debug"));
        assert!(!props.contains_key("keybindings"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fovy").is_some());
        assert!(camera.get("znear").is_none());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = std::env::temp_dir()
            .join(format!("orrery-options-{}", std::process::id()));
        let path = dir.join("custom.toml");
        let mut opts = Options::default();
        opts.layout.seed = Some(7);
        opts.display.background_intensity = 0.75;
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["custom".to_owned()]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
