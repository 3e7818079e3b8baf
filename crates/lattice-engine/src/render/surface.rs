use anyhow::Result;

use crate::device::{Drawable, Gpu};

/// Where the engine draws a frame.
///
/// Implemented by the window-backed frame context and by offscreen targets.
/// Supplies the target size, the color format and, once per frame, the
/// drawable to render into.
pub trait RenderSurface {
    /// Current target size in physical pixels.
    fn target_size(&self) -> (u32, u32);

    /// Color format of every drawable this surface hands out.
    fn target_format(&self) -> wgpu::TextureFormat;

    /// Next drawable. `Ok(None)` skips the frame.
    fn next_drawable(&mut self) -> Result<Option<Drawable>>;

    /// Called right before the drawable is presented.
    fn pre_present(&self) {}
}

/// Offscreen render target backed by a plain texture.
///
/// Every call to [`next_drawable`](RenderSurface::next_drawable) returns a
/// view of the same texture.
pub struct OffscreenSurface {
    texture: wgpu::Texture,
    format: wgpu::TextureFormat,
}

impl OffscreenSurface {
    pub fn new(device: &wgpu::Device, size: (u32, u32), format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lattice offscreen target"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Self { texture, format }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl RenderSurface for OffscreenSurface {
    fn target_size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn next_drawable(&mut self) -> Result<Option<Drawable>> {
        Ok(Some(Drawable::from_texture(&self.texture)))
    }
}

impl RenderSurface for Gpu<'_> {
    fn target_size(&self) -> (u32, u32) {
        let size = self.size();
        (size.width, size.height)
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        self.surface_format()
    }

    fn next_drawable(&mut self) -> Result<Option<Drawable>> {
        Gpu::next_drawable(self)
    }
}
