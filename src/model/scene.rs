use glam::{Mat4, Vec3};

use crate::utils::Vertex;

/// Where the ten tutorial cubes sit.
pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);
const ANGLE_STEP: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub position: Vec3,
    /// Resting rotation about the shared axis, degrees.
    pub angle: f32,
    /// Extra degrees per second when spinning is on.
    pub spin_rate: f32,
}

impl SceneObject {
    pub fn model_matrix(&self, time: f32) -> Mat4 {
        let angle = (self.angle + self.spin_rate * time).to_radians();
        Mat4::from_translation(self.position)
            * Mat4::from_axis_angle(ROTATION_AXIS.normalize(), angle)
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub spin: bool,
}

impl Scene {
    /// The ten-cube layout used throughout the course.
    pub fn tutorial(spin: bool) -> Self {
        let objects = CUBE_POSITIONS
            .iter()
            .enumerate()
            .map(|(i, &position)| SceneObject {
                position,
                angle: ANGLE_STEP * i as f32,
                spin_rate: ANGLE_STEP * (i + 1) as f32,
            })
            .collect();
        Self { objects, spin }
    }

    pub fn model_matrices(&self, time: f32) -> Vec<Mat4> {
        let time = if self.spin { time } else { 0.0 };
        self.objects.iter().map(|o| o.model_matrix(time)).collect()
    }
}

/// Unit cube centred on the origin, two triangles per face, CCW from outside.
pub fn cube_vertices() -> Vec<Vertex> {
    // (normal, tangent u, tangent v) per face; corners are built from them.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        for (s, t) in corners {
            let pos = normal * 0.5 + u * (s - 0.5) + v * (t - 0.5);
            vertices.push(Vertex {
                pos: pos.to_array(),
                normal: normal.to_array(),
                uv: [s, 1.0 - t],
            });
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_vertices_on_the_unit_cube() {
        let verts = cube_vertices();
        assert_eq!(verts.len(), 36);
        for v in &verts {
            assert!(v.pos.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
        }
    }

    #[test]
    fn cube_triangles_wind_counter_clockwise_from_outside() {
        let verts = cube_vertices();
        for tri in verts.chunks(3) {
            let [a, b, c] = [tri[0].pos, tri[1].pos, tri[2].pos].map(Vec3::from);
            let n = (b - a).cross(c - a);
            assert!(n.dot(Vec3::from(tri[0].normal)) > 0.0);
        }
    }

    #[test]
    fn tutorial_scene_rotates_each_cube_further() {
        let scene = Scene::tutorial(false);
        assert_eq!(scene.objects.len(), 10);
        assert_eq!(scene.objects[3].angle, 60.0);
        let first = scene.model_matrices(5.0)[0];
        assert!(first.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn spinning_scene_changes_over_time() {
        let scene = Scene::tutorial(true);
        let a = scene.model_matrices(0.0);
        let b = scene.model_matrices(1.0);
        assert!(!a[0].abs_diff_eq(b[0], 1e-4));
    }
}
