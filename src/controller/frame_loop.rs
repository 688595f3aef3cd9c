use std::time::Instant;

use glam::{Mat4, Vec3};

use crate::config::{AppConfig, ProjectionSettings};
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputState, KeyAction};
use crate::model::{Camera, LightUniform, Material, Scene, Spotlight};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _pad: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera, aspect_ratio: f32, projection: &ProjectionSettings) -> Self {
        Self {
            view_proj: camera
                .view_proj(aspect_ratio, projection.near, projection.far)
                .to_cols_array_2d(),
            view_pos: camera.position().to_array(),
            _pad: 0.0,
        }
    }
}

/// Delta-time source. Deltas are clamped to `[0, max_frame_time]` so a
/// stall (window drag, breakpoint) never teleports the camera.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    max_frame_time: f32,
}

impl FrameClock {
    pub fn new(max_frame_time: f32) -> Self {
        Self {
            last_tick: Instant::now(),
            max_frame_time: max_frame_time.max(0.0),
        }
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta.clamp(0.0, self.max_frame_time)
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

/// Frames per second, measured over one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    window: f32,
    fps: f32,
}

impl FpsCounter {
    /// Count a frame. Returns the new rate when a window closes.
    pub fn tick(&mut self, elapsed_seconds: f32) -> Option<f32> {
        self.frames += 1;
        self.window += elapsed_seconds;
        if self.window < 1.0 {
            return None;
        }
        self.fps = self.frames as f32 / self.window;
        self.frames = 0;
        self.window = 0.0;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// What the window layer has to act on after a frame update.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub camera: CameraUniform,
    pub light: LightUniform,
    pub model_matrices: Vec<Mat4>,
    pub material_index: usize,
    pub quit: bool,
    /// `Some(captured)` when the cursor should be grabbed or released.
    pub capture_changed: Option<bool>,
}

/// Owns everything that changes from frame to frame.
pub struct FrameLoopContext {
    pub camera: Camera,
    pub input: InputState,
    pub controller: CameraController,
    pub spotlight: Spotlight,
    pub scene: Scene,
    pub fps: FpsCounter,
    projection: ProjectionSettings,
    materials: Vec<Material>,
    material_index: usize,
    time: f32,
}

impl FrameLoopContext {
    pub fn new(config: &AppConfig, materials: Vec<Material>) -> Self {
        let camera = Camera::from_settings(&config.camera);
        let mut spotlight = Spotlight::default();
        spotlight.follow(&camera);
        Self {
            camera,
            input: InputState::new(
                config.keybindings.clone(),
                config.controls.look_source,
                config.controls.start_captured,
            ),
            controller: CameraController::from_settings(&config.controls),
            spotlight,
            scene: Scene::tutorial(config.controls.spin_cubes),
            fps: FpsCounter::default(),
            projection: config.projection.clone(),
            materials,
            material_index: 0,
            time: 0.0,
        }
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material_index(&self) -> usize {
        self.material_index
    }

    pub fn active_material(&self) -> Option<&Material> {
        self.materials.get(self.material_index)
    }

    pub fn projection(&self) -> &ProjectionSettings {
        &self.projection
    }

    /// Advance one frame. All pending input is applied before the
    /// matrices in the returned output are computed.
    pub fn update(&mut self, elapsed_seconds: f32, aspect_ratio: f32) -> FrameOutput {
        let mut quit = false;
        let mut capture_changed = None;

        for action in self.input.take_triggered() {
            match action {
                KeyAction::ToggleCapture => {
                    let captured = !self.input.is_captured();
                    self.input.set_captured(captured);
                    capture_changed = Some(captured);
                    tracing::info!(captured, "cursor capture toggled");
                }
                KeyAction::LookAtOrigin => {
                    self.camera.reset_to(Vec3::ZERO);
                    self.input.rearm_look();
                    tracing::info!(
                        yaw = self.camera.yaw(),
                        pitch = self.camera.pitch(),
                        "looking at origin"
                    );
                }
                KeyAction::CycleMaterial => self.cycle_material(),
                KeyAction::ShowFps => tracing::info!(fps = self.fps.fps(), "frame rate"),
                KeyAction::Quit => quit = true,
                _ => {}
            }
        }

        self.controller.apply(&mut self.camera, &mut self.input, elapsed_seconds);
        self.spotlight.follow(&self.camera);
        self.fps.tick(elapsed_seconds);
        self.time += elapsed_seconds.max(0.0);

        FrameOutput {
            camera: CameraUniform::from_camera(&self.camera, aspect_ratio, &self.projection),
            light: self.spotlight.uniform(),
            model_matrices: self.scene.model_matrices(self.time),
            material_index: self.material_index,
            quit,
            capture_changed,
        }
    }

    fn cycle_material(&mut self) {
        if self.materials.is_empty() {
            return;
        }
        self.material_index = (self.material_index + 1) % self.materials.len();
        if let Some(material) = self.active_material() {
            tracing::info!(material = material.name(), "material changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use crate::model::BasicMaterial;
    use std::time::Duration;

    fn context() -> FrameLoopContext {
        let materials = vec![
            Material::basic("gold", BasicMaterial::GOLD),
            Material::basic("jade", BasicMaterial::JADE),
        ];
        FrameLoopContext::new(&AppConfig::default(), materials)
    }

    #[test]
    fn clock_clamps_long_frames() {
        let mut clock = FrameClock::new(0.1);
        let start = Instant::now();
        clock.tick_at(start);
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), 0.1);
        assert!((clock.tick_at(start + Duration::from_millis(3050)) - 0.05).abs() < 1e-4);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let mut clock = FrameClock::new(0.25);
        let start = Instant::now();
        clock.tick_at(start + Duration::from_secs(1));
        assert_eq!(clock.tick_at(start), 0.0);
    }

    #[test]
    fn fps_reports_once_per_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..7 {
            assert_eq!(fps.tick(0.125), None);
        }
        assert_eq!(fps.tick(0.125), Some(8.0));
        assert_eq!(fps.fps(), 8.0);
        assert_eq!(fps.tick(0.125), None);
    }

    #[test]
    fn capture_toggle_is_reported() {
        let mut ctx = context();
        assert!(ctx.input.is_captured());
        ctx.input.process_event(&InputEvent::KeyDown("KeyC".into()));
        let out = ctx.update(0.016, 4.0 / 3.0);
        assert_eq!(out.capture_changed, Some(false));
        assert!(!ctx.input.is_captured());
    }

    #[test]
    fn material_cycle_wraps() {
        let mut ctx = context();
        for expected in [1, 0, 1] {
            ctx.input.process_event(&InputEvent::KeyDown("KeyM".into()));
            assert_eq!(ctx.update(0.0, 1.0).material_index, expected);
        }
    }

    #[test]
    fn look_at_origin_points_front_at_origin() {
        let mut ctx = context();
        ctx.camera.move_in(crate::model::CameraMovement::Right, 1.0);
        ctx.input.process_event(&InputEvent::KeyDown("Backspace".into()));
        ctx.update(0.0, 1.0);
        let to_origin = (-ctx.camera.position()).normalize();
        assert!(ctx.camera.front().abs_diff_eq(to_origin, 1e-4));
    }

    #[test]
    fn spotlight_tracks_camera_after_movement() {
        let mut ctx = context();
        ctx.input.process_event(&InputEvent::KeyDown("KeyW".into()));
        let out = ctx.update(1.0, 1.0);
        assert_eq!(out.light.position, ctx.camera.position().to_array());
        assert_eq!(out.camera.view_pos, ctx.camera.position().to_array());
        assert_eq!(out.model_matrices.len(), 10);
    }

    #[test]
    fn quit_key_requests_exit() {
        let mut ctx = context();
        ctx.input.process_event(&InputEvent::KeyDown("Escape".into()));
        assert!(ctx.update(0.0, 1.0).quit);
    }
}
