use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by binaries.
///
/// An `Err` from any callback is logged and ends the event loop.
pub trait App {
    /// Called once per window, right after its GPU context was created and
    /// before its first frame.
    fn on_gpu_ready(&mut self, window_id: WindowId, gpu: &Gpu<'_>) -> Result<()> {
        let _ = (window_id, gpu);
        Ok(())
    }

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;

    /// Called after a window was closed, before its GPU context is dropped.
    fn on_window_closed(&mut self, window_id: WindowId) {
        let _ = window_id;
    }
}
