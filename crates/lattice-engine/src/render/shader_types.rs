//! GPU-visible record layouts shared with `shaders/instanced.wgsl`.
//!
//! Every struct here is `#[repr(C)]` + `Pod` so it can be uploaded with
//! `bytemuck::cast_slice` without an intermediate copy. Field offsets must stay
//! in sync with the WGSL declarations.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use half::f16;

// ── vertex ────────────────────────────────────────────────────────────────

/// Per-vertex mesh data (24 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexData {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl VertexData {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];

    #[inline]
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexData>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── instance ──────────────────────────────────────────────────────────────

/// Per-instance data (116 bytes), bound as a per-instance vertex buffer.
///
///  offset   0  transform         [[f32; 4]; 4]  loc 2..=5
///  offset  64  normal_transform  [[f32; 3]; 3]  loc 6..=8
///  offset 100  color             [f32; 4]       loc 9
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub transform: [[f32; 4]; 4],
    pub normal_transform: [[f32; 3]; 3],
    pub color: [f32; 4],
}

impl InstanceData {
    const ATTRS: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        2 => Float32x4, // transform col 0
        3 => Float32x4, // transform col 1
        4 => Float32x4, // transform col 2
        5 => Float32x4, // transform col 3
        6 => Float32x3, // normal col 0
        7 => Float32x3, // normal col 1
        8 => Float32x3, // normal col 2
        9 => Float32x4  // color
    ];

    pub fn new(transform: Mat4, normal_transform: Mat3, color: [f32; 4]) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            normal_transform: normal_transform.to_cols_array_2d(),
            color,
        }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

// ── camera ────────────────────────────────────────────────────────────────

/// Camera uniform (176 bytes).
///
/// WGSL `mat3x3<f32>` occupies three 16-byte columns in the uniform address
/// space, so the normal matrix is stored padded.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub perspective_transform: [[f32; 4]; 4],
    pub world_transform: [[f32; 4]; 4],
    pub world_normal_transform: [[f32; 4]; 3],
}

impl CameraData {
    pub fn new(perspective: Mat4, world: Mat4, world_normal: Mat3) -> Self {
        Self {
            perspective_transform: perspective.to_cols_array_2d(),
            world_transform: world.to_cols_array_2d(),
            world_normal_transform: pad_mat3(world_normal),
        }
    }
}

fn pad_mat3(m: Mat3) -> [[f32; 4]; 3] {
    let c = m.to_cols_array_2d();
    [
        [c[0][0], c[0][1], c[0][2], 0.0],
        [c[1][0], c[1][1], c[1][2], 0.0],
        [c[2][0], c[2][1], c[2][2], 0.0],
    ]
}

// ── light ─────────────────────────────────────────────────────────────────

/// Point light uniform (48 bytes).
///
///  offset  0  position     vec3<f32>
///  offset 16  color        3 × f16 (+1 pad), read as vec2<u32> + unpack2x16float
///  offset 24  intensity    f32
///  offset 28  range        f32
///  offset 32  pulse_speed  f32
///  offset 36  time         f32
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightData {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub color: [f16; 4],
    pub intensity: f32,
    pub range: f32,
    pub pulse_speed: f32,
    pub time: f32,
    pub _pad1: [f32; 2],
}

impl LightData {
    pub fn new(
        position: Vec3,
        color: [f32; 3],
        intensity: f32,
        range: f32,
        pulse_speed: f32,
        time: f32,
    ) -> Self {
        Self {
            position: position.to_array(),
            _pad0: 0.0,
            color: [
                f16::from_f32(color[0]),
                f16::from_f32(color[1]),
                f16::from_f32(color[2]),
                f16::ZERO,
            ],
            intensity,
            range,
            pulse_speed,
            time,
            _pad1: [0.0; 2],
        }
    }
}
