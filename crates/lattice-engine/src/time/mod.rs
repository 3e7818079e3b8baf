//! Frame timing.
//!
//! - one `FrameClock` per window
//! - call `tick()` once per redraw to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
