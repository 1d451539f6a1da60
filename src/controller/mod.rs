// CONTROLLER: input handling and the per-frame update loop
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod frame_loop;

pub use input::{InputProcessor, RotationEvent, RotationState, ROTATION_STEP};
#[cfg(target_arch = "wasm32")]
pub use frame_loop::FrameLoopContext;
