//! Application settings with TOML file support.
//!
//! Every section uses `#[serde(default)]`, so a file that only overrides
//! `[camera]` (or nothing at all) still produces a complete configuration.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::controller::input::KeyBindings;
use crate::error::FlycamError;
use crate::model::camera::{
    DEFAULT_FOV, DEFAULT_PITCH, DEFAULT_SENSITIVITY, DEFAULT_SPEED, DEFAULT_YAW,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub projection: ProjectionSettings,
    pub controls: ControlSettings,
    pub keybindings: KeyBindings,
    pub assets: AssetSettings,
}

impl AppConfig {
    /// Load from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, FlycamError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, FlycamError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, FlycamError> {
        toml::to_string_pretty(self).map_err(|e| FlycamError::ConfigParse(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), FlycamError> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "flycam".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Initial camera state. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            fov: DEFAULT_FOV,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self { near: 0.1, far: 100.0 }
    }
}

/// Where mouse-look deltas come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookSource {
    /// Relative device motion; unaffected by cursor clamping at window edges.
    #[default]
    Raw,
    /// Differences between successive absolute cursor positions.
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub sprint_multiplier: f32,
    pub look_source: LookSource,
    /// Upper bound on a single frame's elapsed time, seconds.
    pub max_frame_time: f32,
    pub start_captured: bool,
    pub spin_cubes: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            sprint_multiplier: 2.0,
            look_source: LookSource::Raw,
            max_frame_time: 0.25,
            start_captured: true,
            spin_cubes: false,
        }
    }
}

/// Texture maps for the textured container material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    pub diffuse_map: PathBuf,
    pub specular_map: PathBuf,
    pub emission_map: Option<PathBuf>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            diffuse_map: PathBuf::from("assets/container2.png"),
            specular_map: PathBuf::from("assets/container2_specular.png"),
            emission_map: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let text = r"
[camera]
fov = 30.0

[controls]
look_source = 'cursor'
";
        let config = AppConfig::from_toml_str(text).unwrap();
        assert_eq!(config.camera.fov, 30.0);
        assert_eq!(config.camera.yaw, -90.0);
        assert_eq!(config.controls.look_source, LookSource::Cursor);
        assert_eq!(config.controls.sprint_multiplier, 2.0);
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn keybinding_overrides_merge_with_defaults() {
        let text = r#"
[keybindings]
quit = "KeyQ"
"#;
        let config = AppConfig::from_toml_str(text).unwrap();
        assert_eq!(config.keybindings.lookup("KeyQ"), Some(KeyAction::Quit));
        assert_eq!(config.keybindings.lookup("Escape"), None);
        assert_eq!(config.keybindings.lookup("KeyW"), Some(KeyAction::MoveForward));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("[camera\nfov = ").unwrap_err();
        assert!(matches!(err, FlycamError::ConfigParse(_)));
    }
}
