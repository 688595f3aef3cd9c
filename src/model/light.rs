use glam::Vec3;

use crate::model::Camera;

/// Flashlight carried by the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub position: Vec3,
    pub direction: Vec3,
    /// Full-intensity cone half-angle, degrees.
    pub cut_off: f32,
    /// Edge of the soft falloff, degrees.
    pub outer_cut_off: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Spotlight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            cut_off: 12.5,
            outer_cut_off: 17.5,
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::ONE,
            constant: 1.0,
            linear: 0.007,
            quadratic: 0.0002,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub cut_off: f32,
    pub direction: [f32; 3],
    pub outer_cut_off: f32,
    pub ambient: [f32; 3],
    pub constant: f32,
    pub diffuse: [f32; 3],
    pub linear: f32,
    pub specular: [f32; 3],
    pub quadratic: f32,
}

impl Spotlight {
    pub fn follow(&mut self, camera: &Camera) {
        self.position = camera.position();
        self.direction = camera.front();
    }

    pub fn uniform(&self) -> LightUniform {
        LightUniform {
            position: self.position.to_array(),
            cut_off: self.cut_off.to_radians().cos(),
            direction: self.direction.to_array(),
            outer_cut_off: self.outer_cut_off.to_radians().cos(),
            ambient: self.ambient.to_array(),
            constant: self.constant,
            diffuse: self.diffuse.to_array(),
            linear: self.linear,
            specular: self.specular.to_array(),
            quadratic: self.quadratic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_camera() {
        let mut cam = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        cam.apply_mouse_delta(100.0, 0.0);
        let mut light = Spotlight::default();
        light.follow(&cam);
        assert_eq!(light.position, cam.position());
        assert_eq!(light.direction, cam.front());
    }

    #[test]
    fn cutoffs_are_sent_as_cosines() {
        let u = Spotlight::default().uniform();
        assert!((u.cut_off - 12.5f32.to_radians().cos()).abs() < 1e-6);
        // Inner cone is narrower, so its cosine is larger.
        assert!(u.cut_off > u.outer_cut_off);
    }
}
