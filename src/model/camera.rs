use glam::{Mat4, Vec3};

use crate::config::CameraSettings;

/// Pitch limit in degrees. Staying short of 90 keeps `front` off `world_up`.
pub const PITCH_LIMIT: f32 = 89.0;
pub const FOV_MIN: f32 = 1.0;
pub const FOV_MAX: f32 = 45.0;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_FOV: f32 = 45.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

/// Directions a held key can push the camera in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// First-person camera. Angles are in degrees.
///
/// `front`, `right` and `up` are derived from `yaw`, `pitch` and `world_up`
/// and are only ever written by [`Camera::update_vectors`].
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    world_up: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    fov: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
}

impl Camera {
    /// Camera at `position` looking down -Z with the tutorial defaults.
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(
            position,
            Vec3::Y,
            DEFAULT_YAW,
            DEFAULT_PITCH,
            DEFAULT_FOV,
            DEFAULT_SPEED,
            DEFAULT_SENSITIVITY,
        )
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::with_orientation(
            settings.position,
            settings.world_up,
            settings.yaw,
            settings.pitch,
            settings.fov,
            settings.movement_speed,
            settings.mouse_sensitivity,
        )
    }

    pub fn with_orientation(
        position: Vec3,
        world_up: Vec3,
        yaw: f32,
        pitch: f32,
        fov: f32,
        movement_speed: f32,
        mouse_sensitivity: f32,
    ) -> Self {
        let world_up = world_up.try_normalize().unwrap_or(Vec3::Y);
        let mut camera = Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            world_up,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: world_up,
            fov: fov.clamp(FOV_MIN, FOV_MAX),
            movement_speed,
            mouse_sensitivity,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Vec3 { self.position }
    pub fn front(&self) -> Vec3 { self.front }
    pub fn right(&self) -> Vec3 { self.right }
    pub fn up(&self) -> Vec3 { self.up }
    pub fn world_up(&self) -> Vec3 { self.world_up }
    pub fn yaw(&self) -> f32 { self.yaw }
    pub fn pitch(&self) -> f32 { self.pitch }
    pub fn fov(&self) -> f32 { self.fov }
    pub fn movement_speed(&self) -> f32 { self.movement_speed }
    pub fn mouse_sensitivity(&self) -> f32 { self.mouse_sensitivity }

    /// Turn the camera by a look offset. `dy` is up-positive: the input layer
    /// has already flipped screen-space y.
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch = (self.pitch + dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Zoom by narrowing the field of view.
    pub fn apply_scroll(&mut self, dy: f32) {
        self.fov = (self.fov - dy).clamp(FOV_MIN, FOV_MAX);
    }

    /// Displace along one basis vector, scaled by elapsed time.
    pub fn move_in(&mut self, direction: CameraMovement, elapsed_seconds: f32) {
        let distance = self.movement_speed * elapsed_seconds.max(0.0);
        let step = match direction {
            CameraMovement::Forward => self.front,
            CameraMovement::Backward => -self.front,
            CameraMovement::Right => self.right,
            CameraMovement::Left => -self.right,
            CameraMovement::Up => self.world_up,
            CameraMovement::Down => -self.world_up,
        };
        self.position += step * distance;
    }

    /// Point the camera at `target` from its current position.
    pub fn reset_to(&mut self, target: Vec3) {
        let Some(dir) = (target - self.position).try_normalize() else {
            return;
        };
        // Angles are measured against +Y; rotate into that frame when a
        // custom world_up is configured.
        let to_y_up = glam::Quat::from_rotation_arc(self.world_up, Vec3::Y);
        let dir = to_y_up * dir;
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with `fov` as the vertical angle, depth in [0, 1].
    pub fn projection_matrix(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect_ratio, near, far)
    }

    pub fn view_proj(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio, near, far) * self.view_matrix()
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let direction = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        let to_world = glam::Quat::from_rotation_arc(Vec3::Y, self.world_up);
        self.front = (to_world * direction).normalize();
        self.right = self.front.cross(self.world_up).try_normalize().unwrap_or(self.right);
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn zero_delta_is_noop() {
        let mut cam = Camera::default();
        let before = (cam.yaw(), cam.pitch(), cam.front());
        cam.apply_mouse_delta(0.0, 0.0);
        assert_eq!(before, (cam.yaw(), cam.pitch(), cam.front()));
    }

    #[test]
    fn mouse_up_tilts_view_up() {
        let mut cam = Camera::default();
        cam.apply_mouse_delta(0.0, 50.0);
        assert!((cam.pitch() - 5.0).abs() < EPS);
        assert!(cam.front().y > 0.0);
    }

    #[test]
    fn pitch_clamps_both_ways() {
        let mut cam = Camera::default();
        cam.apply_mouse_delta(0.0, 1000.0);
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        cam.apply_mouse_delta(0.0, -5000.0);
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn scroll_clamps_fov() {
        let mut cam = Camera::default();
        cam.apply_scroll(100.0);
        assert_eq!(cam.fov(), FOV_MIN);
        cam.apply_scroll(-100.0);
        assert_eq!(cam.fov(), FOV_MAX);
        cam.apply_scroll(5.0);
        assert_eq!(cam.fov(), 40.0);
    }

    #[test]
    fn up_and_down_follow_world_up_not_camera_up() {
        let mut cam = Camera::default();
        cam.apply_mouse_delta(0.0, 300.0);
        let start = cam.position();
        cam.move_in(CameraMovement::Up, 1.0);
        assert!((cam.position() - start).abs_diff_eq(Vec3::Y * DEFAULT_SPEED, EPS));
        cam.move_in(CameraMovement::Down, 1.0);
        assert!(cam.position().abs_diff_eq(start, EPS));
    }

    #[test]
    fn negative_elapsed_does_not_move() {
        let mut cam = Camera::default();
        let start = cam.position();
        cam.move_in(CameraMovement::Forward, -1.0);
        assert_eq!(cam.position(), start);
    }

    #[test]
    fn reset_to_origin_faces_origin() {
        let mut cam = Camera::new(Vec3::new(3.0, 2.0, 5.0));
        cam.reset_to(Vec3::ZERO);
        let expected = (Vec3::ZERO - cam.position()).normalize();
        assert!(cam.front().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn reset_to_own_position_is_noop() {
        let mut cam = Camera::default();
        let front = cam.front();
        cam.reset_to(cam.position());
        assert_eq!(cam.front(), front);
    }

    #[test]
    fn reset_to_straight_above_clamps_pitch() {
        let mut cam = Camera::new(Vec3::ZERO);
        cam.reset_to(Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        assert!(cam.right().is_normalized());
    }

    #[test]
    fn view_matrix_maps_position_to_origin() {
        let cam = Camera::default();
        let p = cam.view_matrix().transform_point3(cam.position());
        assert!(p.abs_diff_eq(Vec3::ZERO, EPS));
        let ahead = cam.view_matrix().transform_point3(cam.position() + cam.front());
        assert!(ahead.abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn custom_world_up_keeps_basis_orthonormal() {
        let cam = Camera::with_orientation(Vec3::ZERO, Vec3::Z, 30.0, 10.0, 45.0, 1.0, 0.1);
        assert!((cam.world_up() - Vec3::Z).length() < EPS);
        assert!(cam.front().dot(cam.right()).abs() < EPS);
        assert!(cam.up().dot(cam.right()).abs() < EPS);
        assert!(cam.up().dot(cam.world_up()) > 0.0);
    }

    #[test]
    fn zero_world_up_falls_back_to_y() {
        let cam = Camera::with_orientation(Vec3::ZERO, Vec3::ZERO, -90.0, 0.0, 45.0, 1.0, 0.1);
        assert_eq!(cam.world_up(), Vec3::Y);
    }
}
