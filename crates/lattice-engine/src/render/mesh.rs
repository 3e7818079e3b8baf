//! Procedural mesh producers.
//!
//! Meshes are generated on the CPU once and uploaded as immutable vertex/index
//! buffers. Indices are 16-bit, so every mesh is capped at 65536 vertices.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, ensure};

use super::shader_types::VertexData;

/// CPU-side geometry source.
pub trait Mesh {
    fn vertices(&self) -> Vec<VertexData>;
    fn indices(&self) -> Vec<u16>;
}

/// Closed set of built-in shapes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MeshKind {
    #[default]
    Sphere,
    Cube,
}

impl MeshKind {
    /// Parses a shape name (case-insensitive). Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sphere" => Some(Self::Sphere),
            "cube" => Some(Self::Cube),
            _ => None,
        }
    }
}

impl FromStr for MeshKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| anyhow::anyhow!("unknown mesh kind {s:?} (expected sphere|cube)"))
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sphere => f.write_str("sphere"),
            Self::Cube => f.write_str("cube"),
        }
    }
}

/// Builds the default mesh for `kind`: a 0.5-radius 20×20 sphere or a cube of
/// half-extent 0.5.
pub fn create_mesh(kind: MeshKind) -> Box<dyn Mesh> {
    match kind {
        MeshKind::Sphere => Box::new(SphereMesh {
            radius: 0.5,
            stacks: 20,
            slices: 20,
        }),
        MeshKind::Cube => Box::new(CubeMesh::new(0.5)),
    }
}

// ── sphere ────────────────────────────────────────────────────────────────

/// Latitude/longitude sphere.
///
/// Produces `(stacks + 1) * (slices + 1)` vertices (the seam column is
/// duplicated) and `stacks * slices * 6` indices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereMesh {
    radius: f32,
    stacks: u32,
    slices: u32,
}

impl SphereMesh {
    pub fn new(radius: f32, stacks: u32, slices: u32) -> Result<Self> {
        ensure!(radius > 0.0 && radius.is_finite(), "sphere radius must be positive, got {radius}");
        ensure!(stacks > 0 && slices > 0, "sphere needs at least one stack and one slice");

        let vertex_count = (u64::from(stacks) + 1) * (u64::from(slices) + 1);
        ensure!(
            vertex_count <= u64::from(u16::MAX) + 1,
            "sphere {stacks}x{slices} needs {vertex_count} vertices, exceeds 16-bit indices"
        );

        Ok(Self { radius, stacks, slices })
    }
}

impl Mesh for SphereMesh {
    fn vertices(&self) -> Vec<VertexData> {
        let mut vertices =
            Vec::with_capacity(((self.stacks + 1) * (self.slices + 1)) as usize);

        for i in 0..=self.stacks {
            let phi = i as f32 / self.stacks as f32 * PI;
            for j in 0..=self.slices {
                let theta = j as f32 / self.slices as f32 * (PI * 2.0);

                let x = self.radius * phi.sin() * theta.cos();
                let y = self.radius * phi.cos();
                let z = self.radius * phi.sin() * theta.sin();

                vertices.push(VertexData::new(
                    [x, y, z],
                    [x / self.radius, y / self.radius, z / self.radius],
                ));
            }
        }

        vertices
    }

    fn indices(&self) -> Vec<u16> {
        let mut indices = Vec::with_capacity((self.stacks * self.slices * 6) as usize);

        for i in 0..self.stacks {
            for j in 0..self.slices {
                let first = (i * (self.slices + 1) + j) as u16;
                let second = first + self.slices as u16 + 1;

                indices.extend_from_slice(&[first, second, first + 1]);
                indices.extend_from_slice(&[second, second + 1, first + 1]);
            }
        }

        indices
    }
}

// ── cube ──────────────────────────────────────────────────────────────────

/// Axis-aligned cube with per-face normals: 24 vertices, 36 indices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeMesh {
    half_extent: f32,
}

impl CubeMesh {
    pub const fn new(half_extent: f32) -> Self {
        Self { half_extent }
    }
}

impl Mesh for CubeMesh {
    fn vertices(&self) -> Vec<VertexData> {
        let s = self.half_extent;
        let v = VertexData::new;

        vec![
            // front (+Z)
            v([-s, -s, s], [0.0, 0.0, 1.0]),
            v([s, -s, s], [0.0, 0.0, 1.0]),
            v([s, s, s], [0.0, 0.0, 1.0]),
            v([-s, s, s], [0.0, 0.0, 1.0]),
            // right (+X)
            v([s, -s, s], [1.0, 0.0, 0.0]),
            v([s, -s, -s], [1.0, 0.0, 0.0]),
            v([s, s, -s], [1.0, 0.0, 0.0]),
            v([s, s, s], [1.0, 0.0, 0.0]),
            // back (-Z)
            v([s, -s, -s], [0.0, 0.0, -1.0]),
            v([-s, -s, -s], [0.0, 0.0, -1.0]),
            v([-s, s, -s], [0.0, 0.0, -1.0]),
            v([s, s, -s], [0.0, 0.0, -1.0]),
            // left (-X)
            v([-s, -s, -s], [-1.0, 0.0, 0.0]),
            v([-s, -s, s], [-1.0, 0.0, 0.0]),
            v([-s, s, s], [-1.0, 0.0, 0.0]),
            v([-s, s, -s], [-1.0, 0.0, 0.0]),
            // top (+Y)
            v([-s, s, s], [0.0, 1.0, 0.0]),
            v([s, s, s], [0.0, 1.0, 0.0]),
            v([s, s, -s], [0.0, 1.0, 0.0]),
            v([-s, s, -s], [0.0, 1.0, 0.0]),
            // bottom (-Y)
            v([-s, -s, -s], [0.0, -1.0, 0.0]),
            v([s, -s, -s], [0.0, -1.0, 0.0]),
            v([s, -s, s], [0.0, -1.0, 0.0]),
            v([-s, -s, s], [0.0, -1.0, 0.0]),
        ]
    }

    fn indices(&self) -> Vec<u16> {
        (0..6u16)
            .flat_map(|face| {
                let b = face * 4;
                [b, b + 1, b + 2, b + 2, b + 3, b]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sphere ────────────────────────────────────────────────────────────

    #[test]
    fn sphere_counts_follow_stacks_and_slices() {
        for (stacks, slices) in [(1, 1), (2, 3), (20, 20), (7, 13)] {
            let mesh = SphereMesh::new(1.0, stacks, slices).unwrap();
            let vertices = mesh.vertices();
            let indices = mesh.indices();

            assert_eq!(vertices.len() as u32, (stacks + 1) * (slices + 1));
            assert_eq!(indices.len() as u32, stacks * slices * 6);
            assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = SphereMesh::new(2.5, 8, 8).unwrap();
        for v in mesh.vertices() {
            let [x, y, z] = v.position;
            let len = (x * x + y * y + z * z).sqrt();
            assert!((len - 2.5).abs() < 1e-4);

            let [nx, ny, nz] = v.normal;
            assert!(((nx * nx + ny * ny + nz * nz).sqrt() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_poles_are_on_y_axis() {
        let vertices = SphereMesh::new(1.0, 4, 4).unwrap().vertices();
        assert!((vertices[0].position[1] - 1.0).abs() < 1e-6);
        assert!((vertices[vertices.len() - 1].position[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn sphere_rejects_too_many_vertices() {
        assert!(SphereMesh::new(1.0, 256, 256).is_err());
        assert!(SphereMesh::new(1.0, 255, 255).is_ok());
    }

    #[test]
    fn sphere_rejects_degenerate_parameters() {
        assert!(SphereMesh::new(0.0, 4, 4).is_err());
        assert!(SphereMesh::new(1.0, 0, 4).is_err());
        assert!(SphereMesh::new(1.0, 4, 0).is_err());
    }

    // ── cube ──────────────────────────────────────────────────────────────

    #[test]
    fn cube_counts_are_fixed() {
        for s in [0.1, 0.5, 3.0] {
            let mesh = CubeMesh::new(s);
            let indices = mesh.indices();
            assert_eq!(mesh.vertices().len(), 24);
            assert_eq!(indices.len(), 36);
            assert!(indices.iter().all(|&i| i < 24));
        }
    }

    #[test]
    fn cube_side_length_only_scales_positions() {
        let small = CubeMesh::new(0.5).vertices();
        let large = CubeMesh::new(2.0).vertices();

        for (a, b) in small.iter().zip(&large) {
            assert_eq!(a.normal, b.normal);
            for k in 0..3 {
                assert_eq!(a.position[k] * 4.0, b.position[k]);
            }
        }
    }

    #[test]
    fn cube_faces_are_counter_clockwise_from_outside() {
        let mesh = CubeMesh::new(1.0);
        let vertices = mesh.vertices();

        for tri in mesh.indices().chunks(3) {
            let p = |i: u16| glam::Vec3::from(vertices[i as usize].position);
            let n = glam::Vec3::from(vertices[tri[0] as usize].normal);
            let face_normal = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(face_normal.dot(n) > 0.0);
        }
    }

    // ── kind ──────────────────────────────────────────────────────────────

    #[test]
    fn kind_parse_known_names() {
        assert_eq!(MeshKind::parse("sphere"), Some(MeshKind::Sphere));
        assert_eq!(MeshKind::parse(" Cube "), Some(MeshKind::Cube));
    }

    #[test]
    fn kind_parse_unknown_yields_none() {
        assert_eq!(MeshKind::parse("torus"), None);
        assert!("torus".parse::<MeshKind>().is_err());
    }

    #[test]
    fn create_mesh_defaults() {
        let sphere = create_mesh(MeshKind::Sphere);
        assert_eq!(sphere.vertices().len(), 21 * 21);
        assert_eq!(sphere.indices().len(), 20 * 20 * 6);

        let cube = create_mesh(MeshKind::Cube);
        assert_eq!(cube.indices().len(), 36);
    }
}
