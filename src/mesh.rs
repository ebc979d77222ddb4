//! Sphere geometry and per-body transforms.
//!
//! - [`Vertex3d`]: position, normal and UV, the layout `body.wgsl` reads
//! - [`Mesh`]: GPU-resident vertex and index buffers
//! - [`Transform`]: where a body's sphere sits and how it is turned and scaled
//!
//! Both bodies share one unit sphere; the transform scales it to the body's
//! radius.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use glam::{Mat4, Quat, Vec3};

use crate::gpu::GpuContext;

/// A vertex for 3D mesh rendering with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    /// Unit length; the sphere's normal equals its position.
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Upload a unit-radius UV sphere.
    pub fn sphere(gpu: &GpuContext, segments: u32, rings: u32) -> Self {
        let (vertices, indices) = sphere_geometry(segments, rings);
        Self::new(gpu, &vertices, &indices)
    }
}

/// Unit-radius UV sphere centered on the origin.
///
/// Ring 0 is the north pole (+Y). `u` runs around the equator and `v` from
/// north to south, which is how equirectangular planet maps are laid out.
/// Triangles wind counter-clockwise seen from outside. `segments` is raised to
/// at least 3 and `rings` to at least 2.
pub fn sphere_geometry(segments: u32, rings: u32) -> (Vec<Vertex3d>, Vec<u32>) {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = std::f32::consts::PI * v;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = std::f32::consts::TAU * u;
            let point = [ring_radius * theta.cos(), y, ring_radius * theta.sin()];
            vertices.push(Vertex3d::new(point, point, [u, v]));
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            indices.extend_from_slice(&[current, current + 1, next]);
            indices.extend_from_slice(&[current + 1, next + 1, next]);
        }
    }

    (vertices, indices)
}

/// Position, rotation and scale of one sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts() {
        let (vertices, indices) = sphere_geometry(32, 32);
        assert_eq!(vertices.len(), 33 * 33);
        assert_eq!(indices.len(), 32 * 32 * 6);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn sphere_vertices_are_on_unit_sphere() {
        let (vertices, _) = sphere_geometry(16, 8);
        for vertex in &vertices {
            let p = Vec3::from_array(vertex.position);
            assert!((p.length() - 1.0).abs() < 1e-5);
            assert_eq!(vertex.normal, vertex.position);
        }
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        assert_eq!(vertices.last().map(|v| v.uv), Some([1.0, 1.0]));
    }

    #[test]
    fn sphere_faces_point_outward() {
        let (vertices, indices) = sphere_geometry(12, 6);
        let mut checked = 0;
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            // Triangles touching a pole collapse to a line.
            if normal.length_squared() < 1e-10 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn tiny_requests_are_raised() {
        let (vertices, indices) = sphere_geometry(0, 0);
        assert_eq!(vertices.len(), 4 * 3);
        assert_eq!(indices.len(), 3 * 2 * 6);
    }

    #[test]
    fn transform_matrix_scales_then_moves() {
        let transform = Transform::new()
            .position(Vec3::new(5.0, 0.0, 0.0))
            .uniform_scale(10.0);
        let p = transform.matrix().transform_point3(Vec3::Y);
        assert!((p - Vec3::new(5.0, 10.0, 0.0)).length() < 1e-5);
    }
}
