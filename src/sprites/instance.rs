//! GPU sprite instance record.

use bytemuck::{Pod, Zeroable};

/// Per-sprite data uploaded for one instanced draw. 32 bytes, no padding.
///
/// Field order and size are a binary contract with the instance-step vertex
/// layout in the shaders; reordering fields corrupts every sprite on screen.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left corner in pixel space (top-left origin).
    pub position: [f32; 2],
    /// Quad size in pixels.
    pub size: [f32; 2],
    /// Normalized atlas rectangle (u0, v0, u1, v1).
    pub uv: [f32; 4],
}

impl SpriteInstance {
    pub const fn new(position: [f32; 2], size: [f32; 2], uv: [f32; 4]) -> Self {
        Self { position, size, uv }
    }

    /// Instance covering the full texture.
    pub const fn full(position: [f32; 2], size: [f32; 2]) -> Self {
        Self::new(position, size, [0.0, 0.0, 1.0, 1.0])
    }

    /// Vertex buffer layout descriptor (instance step).
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: 32, // Fixed 32 bytes
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // position: vec2<f32>
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // size: vec2<f32>
                wgpu::VertexAttribute {
                    offset: 8,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // uv_rect: vec4<f32>
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        assert_eq!(std::mem::align_of::<SpriteInstance>(), 4);
    }

    #[test]
    fn field_offsets_match_vertex_layout() {
        let inst = SpriteInstance::new([1.0, 2.0], [3.0, 4.0], [5.0, 6.0, 7.0, 8.0]);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&inst));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn full_covers_unit_uv() {
        let inst = SpriteInstance::full([0.0, 0.0], [64.0, 64.0]);
        assert_eq!(inst.uv, [0.0, 0.0, 1.0, 1.0]);
    }
}
