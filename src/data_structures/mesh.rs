//! Mesh geometry, kept on the CPU until the first frame that draws it.
//!
//! Loading never touches the GPU: a loaded asset is plain vertex and index
//! data plus its local [`BoundingExtent`]. Buffers are created lazily by
//! [`MeshGeometry::upload`] from the render loop.

use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::data_structures::extent::BoundingExtent;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Per-vertex data consumed by the hologram shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct MeshGeometry {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    bounds: Option<BoundingExtent>,
}

impl MeshGeometry {
    /// Builds a mesh and its local bounds.
    ///
    /// Missing indices are replaced by a plain triangle list over the vertices.
    pub fn new(name: impl Into<String>, vertices: Vec<MeshVertex>, indices: Option<Vec<u32>>) -> Self {
        let indices = indices.unwrap_or_else(|| (0..vertices.len() as u32).collect());
        let bounds = BoundingExtent::from_points(vertices.iter().map(|v| v.position.into()));
        Self {
            name: name.into(),
            vertices,
            indices,
            bounds,
        }
    }

    /// Local-space bounds, `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<BoundingExtent> {
        self.bounds
    }

    /// Replaces every normal by the normalized sum of the face normals of the
    /// triangles that use the vertex.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= acc.len() || b >= acc.len() || c >= acc.len() {
                log::warn!("Mesh {} references a vertex out of range, skipping triangle", self.name);
                continue;
            }
            let p0: cgmath::Vector3<f32> = self.vertices[a].position.into();
            let p1: cgmath::Vector3<f32> = self.vertices[b].position.into();
            let p2: cgmath::Vector3<f32> = self.vertices[c].position.into();
            // Unnormalized: larger faces weigh more.
            let face = (p1 - p0).cross(p2 - p0);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        for (vertex, n) in self.vertices.iter_mut().zip(acc) {
            vertex.normal = if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            };
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
        }
    }
}

#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}
