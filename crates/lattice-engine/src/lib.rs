//! Lattice engine crate.
//!
//! Real-time instanced 3D rendering on wgpu: the host side (window runtime,
//! GPU device, input, timing) and the renderer that draws a 10×10×10 grid of
//! animated meshes with at most three frames in flight.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
