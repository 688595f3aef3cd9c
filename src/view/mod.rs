// VIEW: GPU setup, textures and scene rendering
pub mod gpu_init;
pub mod render;
pub mod texture;

pub use gpu_init::GpuContext;
pub use render::{ObjectUniform, Renderer, CLEAR_COLOR, DEPTH_FORMAT};
