use std::collections::HashMap;

use anyhow::{Context, Result};
use lattice_engine::core::{App, AppControl, FrameCtx};
use lattice_engine::device::Gpu;
use lattice_engine::input::Shortcut;
use lattice_engine::render::{DrawStatus, EngineConfig, RenderEngine};
use winit::window::WindowId;

/// Frames between two frame-rate log lines.
const STATS_INTERVAL: u64 = 300;

/// One render engine per open window.
pub struct LatticeApp {
    config: EngineConfig,
    engines: HashMap<WindowId, RenderEngine>,
    skipped: u64,
}

impl LatticeApp {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engines: HashMap::new(),
            skipped: 0,
        }
    }
}

impl App for LatticeApp {
    fn on_gpu_ready(&mut self, window_id: WindowId, gpu: &Gpu<'_>) -> Result<()> {
        let engine = RenderEngine::new(
            gpu.device().clone(),
            gpu.queue().clone(),
            gpu.surface_format(),
            self.config.clone(),
        )
        .context("failed to create render engine")?;

        self.engines.insert(window_id, engine);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        match Shortcut::triggered(ctx.input_frame, ctx.input.modifiers) {
            Some(Shortcut::Quit) => {
                log::info!("quit requested");
                return Ok(AppControl::Exit);
            }
            Some(Shortcut::CloseWindow) => {
                ctx.close_window();
                return Ok(AppControl::Continue);
            }
            None => {}
        }

        let Some(engine) = self.engines.get_mut(&ctx.window.id) else {
            return Ok(AppControl::Continue);
        };

        if engine.draw(&mut *ctx)? == DrawStatus::Skipped {
            self.skipped += 1;
        }

        let time = ctx.time;
        if time.frame_index > 0 && time.frame_index % STATS_INTERVAL == 0 {
            log::debug!(
                "frame {}: {:.1} fps, t = {:.2}s, {} skipped",
                time.frame_index,
                time.fps(),
                engine.animation().elapsed_time,
                self.skipped
            );
        }

        Ok(AppControl::Continue)
    }

    fn on_window_closed(&mut self, window_id: WindowId) {
        // Drains in-flight frames before the window's surface goes away.
        self.engines.remove(&window_id);
    }
}
