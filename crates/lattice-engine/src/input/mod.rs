//! Keyboard input.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! [`platform`] translates winit window events into `InputEvent`s.

mod frame;
pub mod platform;
mod shortcuts;
mod state;
mod types;

pub use frame::InputFrame;
pub use shortcuts::Shortcut;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers};
