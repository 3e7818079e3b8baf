use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::device::{Drawable, Gpu};
use crate::input::{InputFrame, InputState};
use crate::render::RenderSurface;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
///
/// Implements [`RenderSurface`], so it can be handed straight to
/// `RenderEngine::draw`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Closes the window this frame belongs to once the callback returns.
    pub fn close_window(&mut self) {
        self.runtime.close_window(self.window.id);
    }
}

impl RenderSurface for FrameCtx<'_, '_> {
    fn target_size(&self) -> (u32, u32) {
        self.gpu.target_size()
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        self.gpu.surface_format()
    }

    fn next_drawable(&mut self) -> Result<Option<Drawable>> {
        self.gpu.next_drawable()
    }

    fn pre_present(&self) {
        self.window.window.pre_present_notify();
    }
}
