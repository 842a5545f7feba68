//! Player configuration (JSON, every field optional).

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::controls::ControlDefaults;
use crate::error::PlayerError;

/// Placeholder replaced by the shader filename in `shader_candidates`.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Full-viewport geometry used by the fixed vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// One oversized triangle covering the viewport.
    #[default]
    Triangle,
    /// Two triangles as a 4-vertex strip.
    Quad,
}

/// Optional check that a fragment source declares the expected language version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCheck {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_version_marker")]
    pub marker: String,
}

impl Default for VersionCheck {
    fn default() -> Self {
        Self {
            enabled: false,
            marker: default_version_marker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_manifest_candidates")]
    pub manifest_candidates: Vec<String>,

    /// Candidate templates; `{file}` is replaced by the shader filename.
    #[serde(default = "default_shader_candidates")]
    pub shader_candidates: Vec<String>,

    #[serde(default = "default_image_candidates")]
    pub default_image_candidates: Vec<String>,

    /// Initial selection when the manifest lists it.
    #[serde(default = "default_preferred_shader")]
    pub preferred_shader: String,

    #[serde(default)]
    pub version_check: VersionCheck,

    #[serde(default)]
    pub geometry: Geometry,

    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],

    #[serde(default)]
    pub defaults: ControlDefaults,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            manifest_candidates: default_manifest_candidates(),
            shader_candidates: default_shader_candidates(),
            default_image_candidates: default_image_candidates(),
            preferred_shader: default_preferred_shader(),
            version_check: VersionCheck::default(),
            geometry: Geometry::default(),
            clear_color: default_clear_color(),
            defaults: ControlDefaults::default(),
        }
    }
}

impl PlayerConfig {
    /// Expands `shader_candidates` for one shader filename.
    pub fn shader_candidates_for(&self, file: &str) -> Vec<String> {
        self.shader_candidates
            .iter()
            .map(|template| template.replace(FILE_PLACEHOLDER, file))
            .collect()
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads and validates a config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, PlayerError> {
        let path = path.as_ref();
        let config: PlayerConfig = load_typed_json(path)?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), PlayerError> {
        let invalid = |msg: &str| PlayerError::InvalidConfig {
            path: path.to_path_buf(),
            msg: msg.to_string(),
        };
        if self.manifest_candidates.is_empty() {
            return Err(invalid("manifest_candidates must not be empty"));
        }
        if self.shader_candidates.is_empty() {
            return Err(invalid("shader_candidates must not be empty"));
        }
        if let Some(bad) = self
            .shader_candidates
            .iter()
            .find(|t| !t.contains(FILE_PLACEHOLDER))
        {
            return Err(invalid(&format!(
                "shader candidate `{bad}` has no {FILE_PLACEHOLDER} placeholder"
            )));
        }
        if self.version_check.enabled && self.version_check.marker.trim().is_empty() {
            return Err(invalid("version_check.marker must not be empty when enabled"));
        }
        Ok(())
    }
}

/// Reads a JSON file and deserializes it into `T`.
pub fn load_typed_json<T: DeserializeOwned>(path: &Path) -> Result<T, PlayerError> {
    let bytes = std::fs::read(path).map_err(|source| PlayerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| PlayerError::InvalidConfig {
        path: path.to_path_buf(),
        msg: e.to_string(),
    })
}

fn default_manifest_candidates() -> Vec<String> {
    [
        "/shaders/manifest.json",
        "/manifest.json",
        "./shaders/manifest.json",
        "./manifest.json",
    ]
    .map(String::from)
    .to_vec()
}

fn default_shader_candidates() -> Vec<String> {
    ["/shaders/{file}", "/{file}", "./shaders/{file}", "./{file}"]
        .map(String::from)
        .to_vec()
}

fn default_image_candidates() -> Vec<String> {
    ["/test.png", "/images/test.png"].map(String::from).to_vec()
}

fn default_preferred_shader() -> String {
    "solid_tint.frag".to_string()
}

fn default_version_marker() -> String {
    "#version 300 es".to_string()
}

fn default_clear_color() -> [f32; 4] {
    [0.06, 0.06, 0.06, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = PlayerConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, PlayerConfig::default());
        assert_eq!(cfg.geometry, Geometry::Triangle);
        assert!(!cfg.version_check.enabled);
        assert_eq!(cfg.manifest_candidates[0], "/shaders/manifest.json");
    }

    #[test]
    fn shader_candidates_expand_placeholder() {
        let cfg = PlayerConfig::default();
        assert_eq!(
            cfg.shader_candidates_for("wave.frag"),
            vec![
                "/shaders/wave.frag",
                "/wave.frag",
                "./shaders/wave.frag",
                "./wave.frag"
            ]
        );
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let cfg = PlayerConfig::from_json_str(
            r#"{ "geometry": "quad", "version_check": { "enabled": true } }"#,
        )
        .unwrap();
        assert_eq!(cfg.geometry, Geometry::Quad);
        assert!(cfg.version_check.enabled);
        assert_eq!(cfg.version_check.marker, "#version 300 es");
        assert_eq!(cfg.preferred_shader, "solid_tint.frag");
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let mut cfg = PlayerConfig::default();
        cfg.shader_candidates = vec!["/shaders/fixed.frag".into()];
        let err = cfg.validate(Path::new("player.json")).unwrap_err();
        assert!(err.to_string().contains("placeholder"), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PlayerConfig::from_json_path("/definitely/not/here/player.json").unwrap_err();
        assert!(matches!(err, PlayerError::Io { .. }), "{err:?}");
    }
}
