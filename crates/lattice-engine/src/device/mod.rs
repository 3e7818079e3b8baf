//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring drawables and mapping surface errors to actions

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::{Gpu, request_headless_device};
pub use error::SurfaceErrorAction;
pub use frame::Drawable;
pub use init::GpuInit;
