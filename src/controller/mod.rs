// CONTROLLER: input, camera updates and the per-frame loop
pub mod camera_controller;
pub mod frame_loop;
pub mod input;

pub use camera_controller::CameraController;
pub use frame_loop::{CameraUniform, FpsCounter, FrameClock, FrameLoopContext, FrameOutput};
pub use input::{InputEvent, InputState, KeyAction, KeyBindings, MouseLook};
