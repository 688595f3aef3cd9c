//! First-person fly camera for the introductory graphics tutorials, plus the
//! shared wgpu shell (materials, spotlight, cube scene, HUD) they run in.

pub mod config;
pub mod error;
pub mod logging;
pub mod ui;
pub mod utils;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

pub use config::AppConfig;
pub use error::FlycamError;
pub use model::{Camera, CameraMovement};
