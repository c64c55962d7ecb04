//! Window input reduced to what the camera controller and games read:
//! held keys and buttons, per-frame presses, pointer motion and scroll.
//!
//! No winit types leak out of here; `platform` does the translation.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, MouseButton, Press};
