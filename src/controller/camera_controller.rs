use crate::config::ControlSettings;
use crate::controller::input::{InputState, KeyAction};
use crate::model::Camera;

/// Feeds one frame of accumulated input into the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    pub sprint_multiplier: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self { sprint_multiplier: 2.0 }
    }
}

impl CameraController {
    pub fn new(sprint_multiplier: f32) -> Self {
        Self { sprint_multiplier }
    }

    pub fn from_settings(settings: &ControlSettings) -> Self {
        Self::new(settings.sprint_multiplier)
    }

    /// Look, then zoom, then every held movement. Drains the look and
    /// scroll accumulators.
    pub fn apply(&self, camera: &mut Camera, input: &mut InputState, elapsed_seconds: f32) {
        let (dx, dy) = input.consume_look();
        camera.apply_mouse_delta(dx, dy);

        let scroll = input.consume_scroll();
        if scroll != 0.0 {
            camera.apply_scroll(scroll);
        }

        let step = if input.is_held(KeyAction::Sprint) {
            elapsed_seconds * self.sprint_multiplier
        } else {
            elapsed_seconds
        };
        for direction in input.held_movements() {
            camera.move_in(direction, step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LookSource;
    use crate::controller::input::{InputEvent, KeyBindings};
    use glam::Vec3;

    fn input() -> InputState {
        InputState::new(KeyBindings::default(), LookSource::Raw, true)
    }

    #[test]
    fn sprint_doubles_distance() {
        let controller = CameraController::default();
        let mut walk = Camera::default();
        let mut run = Camera::default();

        let mut state = input();
        state.process_event(&InputEvent::KeyDown("KeyW".into()));
        controller.apply(&mut walk, &mut state, 1.0);

        state.process_event(&InputEvent::KeyDown("ControlLeft".into()));
        controller.apply(&mut run, &mut state, 1.0);

        let walked = walk.position().distance(Vec3::new(0.0, 0.0, 3.0));
        let ran = run.position().distance(Vec3::new(0.0, 0.0, 3.0));
        assert!((walked - 2.5).abs() < 1e-5);
        assert!((ran - 5.0).abs() < 1e-5);
    }

    #[test]
    fn opposite_keys_cancel() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut state = input();
        state.process_event(&InputEvent::KeyDown("KeyA".into()));
        state.process_event(&InputEvent::KeyDown("KeyD".into()));
        controller.apply(&mut camera, &mut state, 0.5);
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-5));
    }

    #[test]
    fn look_is_drained_once() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut state = input();
        state.process_event(&InputEvent::MouseMotion { dx: 0.0, dy: 0.0 });
        state.process_event(&InputEvent::MouseMotion { dx: 100.0, dy: 0.0 });
        controller.apply(&mut camera, &mut state, 0.0);
        assert!((camera.yaw() - (-80.0)).abs() < 1e-4);
        controller.apply(&mut camera, &mut state, 0.0);
        assert!((camera.yaw() - (-80.0)).abs() < 1e-4);
    }
}
