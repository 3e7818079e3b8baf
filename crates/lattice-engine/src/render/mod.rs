//! Instanced 3D rendering.
//!
//! CPU side produces per-frame records ([`animation`]), which are written into
//! rotating GPU buffers ([`frame_pool`]) gated by a permit pool ([`permits`]).
//! [`RenderEngine`] ties them together with the pipeline and meshes.
//!
//! Convention:
//! - right-handed world space, camera looking down -Z
//! - counter-clockwise triangles are front-facing
//! - matrices are column-major, as WGSL expects

pub mod animation;
mod engine;
pub mod frame_pool;
pub mod math;
pub mod mesh;
pub mod permits;
pub mod shader;
pub mod shader_types;
mod surface;

pub use engine::{DEPTH_FORMAT, DrawStatus, EngineConfig, RenderEngine};
pub use mesh::{Mesh, MeshKind};
pub use surface::{OffscreenSurface, RenderSurface};
