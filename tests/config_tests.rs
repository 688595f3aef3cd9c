use std::path::PathBuf;

use flycam::config::{AppConfig, LookSource};
use flycam::controller::KeyAction;
use flycam::{Camera, FlycamError};
use glam::Vec3;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flycam-{}-{name}", std::process::id()))
}

#[test]
fn empty_file_is_the_default_config() {
    assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
}

#[test]
fn full_config_parses() {
    let text = r#"
[window]
title = "camera demo"
width = 1280
height = 720

[camera]
position = [1.0, 2.0, 3.0]
world_up = [0.0, 1.0, 0.0]
yaw = -45.0
pitch = 10.0
fov = 30.0
movement_speed = 5.0
mouse_sensitivity = 0.2

[projection]
near = 0.5
far = 500.0

[controls]
sprint_multiplier = 3.0
look_source = "cursor"
max_frame_time = 0.1
start_captured = false
spin_cubes = true

[keybindings]
quit = "KeyQ"

[assets]
diffuse_map = "textures/wood.png"
specular_map = "textures/wood_specular.png"
emission_map = "textures/glow.jpg"
"#;
    let config = AppConfig::from_toml_str(text).unwrap();
    assert_eq!(config.window.width, 1280);
    assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(config.projection.far, 500.0);
    assert_eq!(config.controls.look_source, LookSource::Cursor);
    assert!(config.controls.spin_cubes);
    assert_eq!(config.keybindings.lookup("KeyQ"), Some(KeyAction::Quit));
    assert_eq!(config.assets.emission_map, Some(PathBuf::from("textures/glow.jpg")));

    let cam = Camera::from_settings(&config.camera);
    assert_eq!(cam.position(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(cam.fov(), 30.0);
    assert_eq!(cam.movement_speed(), 5.0);
}

#[test]
fn out_of_range_camera_settings_are_clamped() {
    let config = AppConfig::from_toml_str("[camera]\npitch = 120.0\nfov = 90.0\n").unwrap();
    let cam = Camera::from_settings(&config.camera);
    assert_eq!(cam.pitch(), 89.0);
    assert_eq!(cam.fov(), 45.0);
}

#[test]
fn unknown_look_source_is_rejected() {
    let err = AppConfig::from_toml_str("[controls]\nlook_source = \"joystick\"\n").unwrap_err();
    assert!(matches!(err, FlycamError::ConfigParse(_)));
}

#[test]
fn save_then_load_preserves_changes() {
    let path = temp_path("roundtrip/flycam.toml");
    let mut config = AppConfig::default();
    config.camera.fov = 20.0;
    config.controls.sprint_multiplier = 4.0;
    config.save(&path).unwrap();

    let loaded = AppConfig::load(&path).unwrap();
    std::fs::remove_dir_all(path.parent().unwrap()).ok();
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = AppConfig::load(&temp_path("does-not-exist.toml")).unwrap_err();
    assert!(matches!(err, FlycamError::Io(_)));
}
