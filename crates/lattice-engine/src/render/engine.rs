//! Instanced lattice renderer.
//!
//! [`RenderEngine`] owns every persistent GPU object of the demo: the
//! pipeline, the mesh buffers and the rotating per-frame buffers. One call to
//! [`RenderEngine::draw`] produces one frame.
//!
//! Frame pacing: a frame takes a permit before touching its slot and hands the
//! permit to the queue's completion callback after submission, so at most
//! `MAX_FRAMES_IN_FLIGHT` frames are queued on the GPU at any time.

use std::mem::size_of;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::animation::{AnimationState, NUM_INSTANCES};
use super::frame_pool::{FrameDataKind, FramePool, FrameSlot, MAX_FRAMES_IN_FLIGHT};
use super::mesh::{self, MeshKind};
use super::permits::PermitPool;
use super::shader::{self, FRAGMENT_ENTRY, ShaderProgram, VERTEX_ENTRY};
use super::shader_types::{CameraData, InstanceData, LightData, VertexData};
use super::surface::RenderSurface;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth16Unorm;

/// Construction parameters for [`RenderEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// WGSL program exposing `vertexMain` and `fragmentMain`.
    pub shader_path: PathBuf,

    /// Shape drawn at every grid cell.
    pub mesh: MeshKind,

    /// Color the target is cleared to before drawing.
    pub clear_color: wgpu::Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shader_path: shader::default_shader_path(),
            mesh: MeshKind::default(),
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
        }
    }
}

/// Outcome of one [`RenderEngine::draw`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawStatus {
    /// Commands were submitted and the drawable presented.
    Presented,
    /// The surface had no drawable this frame; nothing was submitted.
    Skipped,
}

struct DepthTarget {
    size: (u32, u32),
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct RenderEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,

    pipeline: wgpu::RenderPipeline,
    target_format: wgpu::TextureFormat,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,

    frame_pool: FramePool,
    permits: PermitPool,

    animation: AnimationState,
    instances: Vec<InstanceData>,

    depth: Option<DepthTarget>,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Builds every persistent GPU object.
    ///
    /// Fails if the shader cannot be read or validated, if the device rejects
    /// the pipeline built from it, or if the selected mesh cannot be built.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
        config: EngineConfig,
    ) -> Result<Self> {
        let program = ShaderProgram::load(&config.shader_path)
            .context("failed to load the instancing shader")?;

        // Catches mismatches between the program and the pipeline layout.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = program.create_module(&device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lattice frame bgl"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    size_of::<CameraData>(),
                ),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, size_of::<LightData>()),
            ],
        });

        let pipeline = create_pipeline(&device, &module, &bind_group_layout, target_format);

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(anyhow!("{err}").context(format!(
                "failed to create render pipeline for shader {}",
                program.label()
            )));
        }

        let mesh = mesh::create_mesh(config.mesh);
        let vertices = mesh.vertices();
        let indices = mesh.indices();
        anyhow::ensure!(!indices.is_empty(), "{} mesh has no indices", config.mesh);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lattice mesh vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lattice mesh indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let frame_pool = FramePool::new(&device, &bind_group_layout, NUM_INSTANCES);

        log::info!(
            "render engine ready: {} mesh ({} vertices, {} indices), {} instances, {} frames in flight, shader {}",
            config.mesh,
            vertices.len(),
            indices.len(),
            NUM_INSTANCES,
            MAX_FRAMES_IN_FLIGHT,
            program.label()
        );

        Ok(Self {
            device,
            queue,
            pipeline,
            target_format,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            frame_pool,
            permits: PermitPool::new(MAX_FRAMES_IN_FLIGHT),
            animation: AnimationState::new(),
            instances: vec![InstanceData::zeroed(); NUM_INSTANCES],
            depth: None,
            clear_color: config.clear_color,
        })
    }

    /// Renders one frame into `surface`.
    ///
    /// Blocks while `MAX_FRAMES_IN_FLIGHT` frames are still pending on the
    /// GPU. Returns [`DrawStatus::Skipped`] when the surface has no drawable.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface) -> Result<DrawStatus> {
        debug_assert_eq!(surface.target_format(), self.target_format);

        let slot = self.frame_pool.advance();

        let device = &self.device;
        let permit = self.permits.acquire_with(|| {
            if let Err(err) = device.poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            }) {
                log::warn!("device poll failed while waiting for a frame permit: {err:?}");
            }
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lattice frame encoder"),
            });

        self.animation.advance();
        self.write_frame_data(slot);

        self.ensure_depth_target(surface.target_size());

        // The permit is released on every early return below.
        let Some(drawable) = surface.next_drawable()? else {
            return Ok(DrawStatus::Skipped);
        };

        let Some(depth) = self.depth.as_ref().filter(|d| d.size == drawable.size()) else {
            log::debug!(
                "drawable {:?} does not match target size {:?}; skipping frame",
                drawable.size(),
                surface.target_size()
            );
            return Ok(DrawStatus::Skipped);
        };

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lattice instanced pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: drawable.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let instance_buffer = self.frame_pool.buffer_for(FrameDataKind::Instances, slot);

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, self.frame_pool.bind_group_for(slot), &[]);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_vertex_buffer(1, instance_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(
                0..self.index_count,
                0,
                0..self.frame_pool.instance_count() as u32,
            );
        }

        self.queue.submit(Some(encoder.finish()));
        self.queue.on_submitted_work_done(move || drop(permit));

        surface.pre_present();
        drawable.present();

        Ok(DrawStatus::Presented)
    }

    /// Blocks until every submitted frame has completed.
    pub fn wait_idle(&self) {
        while self.permits.outstanding() > 0 {
            if let Err(err) = self.device.poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            }) {
                log::warn!("device poll failed while draining frames: {err:?}");
                break;
            }
        }
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn current_slot(&self) -> FrameSlot {
        self.frame_pool.current_slot()
    }

    pub fn permits(&self) -> &PermitPool {
        &self.permits
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    fn write_frame_data(&mut self, slot: FrameSlot) {
        self.animation.write_instances(&mut self.instances);

        let pool = &self.frame_pool;
        self.queue.write_buffer(
            pool.buffer_for(FrameDataKind::Instances, slot),
            0,
            bytemuck::cast_slice(&self.instances),
        );
        self.queue.write_buffer(
            pool.buffer_for(FrameDataKind::Light, slot),
            0,
            bytemuck::bytes_of(&self.animation.light()),
        );
        self.queue.write_buffer(
            pool.buffer_for(FrameDataKind::Camera, slot),
            0,
            bytemuck::bytes_of(&self.animation.camera()),
        );
    }

    fn ensure_depth_target(&mut self, size: (u32, u32)) {
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }
        if size.0 == 0 || size.1 == 0 {
            self.depth = None;
            return;
        }

        log::debug!("creating depth target {}x{}", size.0, size.1);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lattice depth target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.depth = Some(DepthTarget {
            size,
            _texture: texture,
            view,
        });
    }
}

impl Drop for RenderEngine {
    fn drop(&mut self) {
        self.wait_idle();
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    module: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("lattice pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("lattice instanced pipeline"),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[VertexData::layout(), InstanceData::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),

        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GpuInit, request_headless_device};
    use crate::render::surface::OffscreenSurface;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn headless() -> Option<(wgpu::Device, wgpu::Queue)> {
        match pollster::block_on(request_headless_device(&GpuInit::default())) {
            Ok(pair) => Some(pair),
            Err(err) => {
                eprintln!("skipping GPU test: {err:#}");
                None
            }
        }
    }

    // ── config ────────────────────────────────────────────────────────────

    #[test]
    fn default_config_uses_bundled_shader_and_sphere() {
        let config = EngineConfig::default();
        assert_eq!(config.mesh, MeshKind::Sphere);
        assert!(config.shader_path.ends_with("shaders/instanced.wgsl"));
        assert!(config.shader_path.exists());
        assert_eq!(config.clear_color.r, 0.1);
        assert_eq!(config.clear_color.a, 1.0);
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn construction_with_missing_shader_fails() {
        let Some((device, queue)) = headless() else { return };

        let config = EngineConfig {
            shader_path: PathBuf::from("no/such/shader.wgsl"),
            ..EngineConfig::default()
        };
        let err = RenderEngine::new(device, queue, FORMAT, config)
            .err()
            .expect("missing shader must fail");
        assert!(format!("{err:#}").contains("failed to read shader source"));
    }

    #[test]
    fn construction_starts_idle() {
        let Some((device, queue)) = headless() else { return };

        let engine = RenderEngine::new(device, queue, FORMAT, EngineConfig::default()).unwrap();
        assert_eq!(engine.current_slot(), 0);
        assert_eq!(engine.permits().available(), MAX_FRAMES_IN_FLIGHT);
        assert_eq!(*engine.animation(), AnimationState::new());
    }

    #[test]
    fn construction_with_layout_mismatch_fails() {
        let Some((device, queue)) = headless() else { return };

        // Valid WGSL, but binding 7 is not part of the frame bind group layout.
        let src = r#"
            @group(0) @binding(7) var<uniform> tint: vec4<f32>;

            @vertex
            fn vertexMain(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 1.0);
            }

            @fragment
            fn fragmentMain() -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let path = std::env::temp_dir().join(format!("lattice-layout-mismatch-{}.wgsl", std::process::id()));
        std::fs::write(&path, src).unwrap();

        let config = EngineConfig {
            shader_path: path.clone(),
            ..EngineConfig::default()
        };
        let result = RenderEngine::new(device, queue, FORMAT, config);
        std::fs::remove_file(&path).unwrap();

        let err = result.err().expect("layout mismatch must fail");
        assert!(format!("{err:#}").contains("failed to create render pipeline"));
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn draws_rotate_slots_and_stay_within_permits() {
        let Some((device, queue)) = headless() else { return };

        let mut surface = OffscreenSurface::new(&device, (64, 64), FORMAT);
        let config = EngineConfig {
            mesh: MeshKind::Cube,
            ..EngineConfig::default()
        };
        let mut engine = RenderEngine::new(device, queue, FORMAT, config).unwrap();

        for n in 1..=7usize {
            let status = engine.draw(&mut surface).unwrap();
            assert_eq!(status, DrawStatus::Presented);
            assert_eq!(engine.current_slot(), n % MAX_FRAMES_IN_FLIGHT);
            assert!(engine.permits().outstanding() <= MAX_FRAMES_IN_FLIGHT);
        }

        engine.wait_idle();
        assert_eq!(engine.permits().outstanding(), 0);
        assert!((engine.animation().elapsed_time - 7.0 * 0.016).abs() < 1e-5);
    }

    struct NoDrawable;

    impl RenderSurface for NoDrawable {
        fn target_size(&self) -> (u32, u32) {
            (64, 64)
        }

        fn target_format(&self) -> wgpu::TextureFormat {
            FORMAT
        }

        fn next_drawable(&mut self) -> Result<Option<crate::device::Drawable>> {
            Ok(None)
        }
    }

    #[test]
    fn skipped_frame_returns_its_permit() {
        let Some((device, queue)) = headless() else { return };

        let mut engine = RenderEngine::new(device, queue, FORMAT, EngineConfig::default()).unwrap();
        assert_eq!(engine.draw(&mut NoDrawable).unwrap(), DrawStatus::Skipped);
        assert_eq!(engine.permits().outstanding(), 0);
    }

    // ── rendered output ───────────────────────────────────────────────────

    const READBACK_SIZE: u32 = 256;
    const CLEAR_RGBA8: [u8; 4] = [26, 26, 26, 255];

    /// Draws one frame of `mesh` into an `Rgba8Unorm` target and reads it back.
    fn render_one_frame(mesh: MeshKind) -> Option<Vec<[u8; 4]>> {
        let (device, queue) = headless()?;
        let format = wgpu::TextureFormat::Rgba8Unorm;

        let mut surface = OffscreenSurface::new(&device, (READBACK_SIZE, READBACK_SIZE), format);
        let config = EngineConfig {
            mesh,
            ..EngineConfig::default()
        };
        let mut engine = RenderEngine::new(device.clone(), queue.clone(), format, config).unwrap();
        assert_eq!(engine.draw(&mut surface).unwrap(), DrawStatus::Presented);

        // 256 px * 4 B already satisfies the 256-byte row alignment.
        let bytes_per_row = READBACK_SIZE * 4;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lattice readback"),
            size: u64::from(bytes_per_row * READBACK_SIZE),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: surface.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(READBACK_SIZE),
                },
            },
            wgpu::Extent3d {
                width: READBACK_SIZE,
                height: READBACK_SIZE,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .unwrap();
        rx.recv().unwrap().unwrap();

        let pixels = bytemuck::cast_slice::<u8, [u8; 4]>(&slice.get_mapped_range()).to_vec();
        Some(pixels)
    }

    fn is_clear(px: [u8; 4]) -> bool {
        px.iter().zip(CLEAR_RGBA8).all(|(&a, b)| a.abs_diff(b) <= 1)
    }

    fn assert_lattice_drawn(mesh: MeshKind) {
        let Some(pixels) = render_one_frame(mesh) else { return };
        assert_eq!(pixels.len(), (READBACK_SIZE * READBACK_SIZE) as usize);

        // The grid sits in the middle of the view; corners only see the clear color.
        let n = READBACK_SIZE as usize;
        for idx in [0, n - 1, n * (n - 1), n * n - 1] {
            assert!(is_clear(pixels[idx]), "{mesh} corner {idx} is {:?}", pixels[idx]);
        }

        let drawn = pixels.iter().filter(|&&px| !is_clear(px)).count();
        assert!(drawn > 2_000, "{mesh}: only {drawn} pixels drawn");
        assert!(drawn < pixels.len() / 2, "{mesh}: {drawn} pixels drawn");
    }

    #[test]
    fn sphere_lattice_is_visible_over_clear_color() {
        assert_lattice_drawn(MeshKind::Sphere);
    }

    #[test]
    fn cube_lattice_is_visible_over_clear_color() {
        assert_lattice_drawn(MeshKind::Cube);
    }
}
