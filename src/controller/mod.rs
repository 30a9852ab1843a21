// CONTROLLER: Input and the update loop
pub mod frame_loop;
pub mod input;

pub use frame_loop::FrameLoopContext;
pub use input::{InputProcessor, InputState, KeyBindings, MovementIntent};
