// MODEL: camera, materials, lights and scene layout
pub mod camera;
pub mod light;
pub mod material;
pub mod scene;

pub use camera::{Camera, CameraMovement};
pub use light::{LightUniform, Spotlight};
pub use material::{BasicMaterial, Material, MaterialBinding, MaterialUniform, TextureSlot, TexturedMaterial};
pub use scene::{Scene, SceneObject};
