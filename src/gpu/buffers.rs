//! Quad and instance buffer management.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::sprites::instance::SpriteInstance;

/// Corner of the unit quad each instance is expanded from.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

impl QuadVertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { corner: [x, y] }
    }

    /// Vertex buffer layout descriptor.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

/// Unit quad in [0,1] so `position + corner * size` places it directly.
/// Origin top-left, matching screen space under a top-left ortho projection.
pub fn unit_quad_vertices() -> Vec<QuadVertex> {
    vec![
        QuadVertex::new(0.0, 0.0), // Top-left
        QuadVertex::new(1.0, 0.0), // Top-right
        QuadVertex::new(1.0, 1.0), // Bottom-right
        QuadVertex::new(0.0, 1.0), // Bottom-left
    ]
}

/// Indices for the unit quad (two triangles, six vertices drawn).
pub fn unit_quad_indices() -> Vec<u16> {
    vec![0, 1, 2, 0, 2, 3]
}

/// Buffers for instanced sprite drawing.
pub struct SpriteBuffers {
    /// Unit quad vertex buffer
    pub quad_vertex_buffer: wgpu::Buffer,
    /// Unit quad index buffer
    pub quad_index_buffer: wgpu::Buffer,
    /// Number of indices in quad
    pub quad_index_count: u32,
    /// Dynamic instance buffer
    pub instance_buffer: wgpu::Buffer,
    /// Current instance buffer capacity
    pub instance_capacity: usize,
}

impl SpriteBuffers {
    /// Create sprite buffers with initial instance capacity.
    pub fn new(device: &wgpu::Device, initial_capacity: usize) -> Self {
        let quad_verts = unit_quad_vertices();
        let quad_indices = unit_quad_indices();

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&quad_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad Index Buffer"),
            contents: bytemuck::cast_slice(&quad_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = Self::allocate_instances(device, initial_capacity.max(1));

        Self {
            quad_vertex_buffer,
            quad_index_buffer,
            quad_index_count: quad_indices.len() as u32,
            instance_buffer,
            instance_capacity: initial_capacity.max(1),
        }
    }

    /// Upload a frame's instance records, growing the buffer if needed.
    pub fn upload_instances(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[SpriteInstance],
    ) {
        if instances.is_empty() {
            return;
        }

        if instances.len() > self.instance_capacity {
            let new_capacity = (instances.len() * 2).max(1024);
            self.instance_buffer = Self::allocate_instances(device, new_capacity);
            self.instance_capacity = new_capacity;
            tracing::debug!("Grew sprite instance buffer to {} capacity", new_capacity);
        }

        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
    }

    fn allocate_instances(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Instance Buffer"),
            size: (capacity * std::mem::size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_quad_shape() {
        let verts = unit_quad_vertices();
        let indices = unit_quad_indices();

        assert_eq!(verts.len(), 4);
        assert_eq!(indices.len(), 6); // 2 triangles, 6 vertices per instance

        assert_eq!(verts[0].corner, [0.0, 0.0]);
        assert_eq!(verts[1].corner, [1.0, 0.0]);
        assert_eq!(verts[2].corner, [1.0, 1.0]);
        assert_eq!(verts[3].corner, [0.0, 1.0]);

        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }
}
