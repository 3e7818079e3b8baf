/// Presentable image target for one frame.
///
/// Short-lived: holding a surface-backed drawable prevents acquisition of the
/// next one. Offscreen drawables wrap a caller-owned texture and have nothing
/// to present.
pub struct Drawable {
    view: wgpu::TextureView,
    size: (u32, u32),
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl Drawable {
    /// Wraps a texture acquired from a window surface.
    pub fn from_surface(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let size = (surface_texture.texture.width(), surface_texture.texture.height());

        Self {
            view,
            size,
            surface_texture: Some(surface_texture),
        }
    }

    /// Wraps an offscreen render attachment.
    pub fn from_texture(texture: &wgpu::Texture) -> Self {
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            size: (texture.width(), texture.height()),
            surface_texture: None,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Presents a surface-backed drawable. Must be called after submission.
    pub fn present(self) {
        let Self {
            view,
            surface_texture,
            ..
        } = self;
        drop(view);
        if let Some(texture) = surface_texture {
            texture.present();
        }
    }
}
