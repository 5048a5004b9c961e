//! Render pipelines for each pass kind.
//!
//! Each pass (sprite, shadow, mask, font) is its own `wgpu::RenderPipeline`
//! with its blend state baked in, so switching passes can never leave stale
//! blend state behind for the next bucket.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::buffers::QuadVertex;
use super::texture::Texture;
use crate::sprites::instance::SpriteInstance;

/// Uniforms shared by the sprite, shadow, and mask passes.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SpriteGlobals {
    view_proj: [f32; 16],
}

/// Uniforms for the font pass: projection plus text tint.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FontGlobals {
    view_proj: [f32; 16],
    tint: [f32; 4],
}

/// One pipeline per pass kind, plus the shared bind group layouts.
pub struct PassPipelines {
    /// Base sprite pass, standard alpha blending.
    pub sprite: wgpu::RenderPipeline,
    /// Shadow composite pass: alpha blending, black-translucent tint.
    pub shadow: wgpu::RenderPipeline,
    /// Mask composite pass: multiplicative blending.
    pub mask: wgpu::RenderPipeline,
    /// MSDF text pass.
    pub font: wgpu::RenderPipeline,

    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    sprite_globals_buffer: wgpu::Buffer,
    pub sprite_globals_bind_group: wgpu::BindGroup,
    font_globals_buffer: wgpu::Buffer,
    pub font_globals_bind_group: wgpu::BindGroup,
}

impl PassPipelines {
    /// Build all pass pipelines for the given surface format.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
        });
        let font_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Font Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/font.wgsl").into()),
        });

        // Globals uniform bind group layout (group 0)
        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sprite Globals Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Atlas texture bind group layout (group 1)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Atlas Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let sprite_globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Globals Buffer"),
            size: std::mem::size_of::<SpriteGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sprite_globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Globals Bind Group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sprite_globals_buffer.as_entire_binding(),
            }],
        });

        let font_globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Font Globals Buffer"),
            size: std::mem::size_of::<FontGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let font_globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Font Globals Bind Group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: font_globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Multiplicative blend for the mask pass: dst * src
        let multiply_blend = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Dst,
                dst_factor: wgpu::BlendFactor::Zero,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Zero,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let build = |label: &str,
                     shader: &wgpu::ShaderModule,
                     fs_entry: &str,
                     blend: wgpu::BlendState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: "vs_main",
                    buffers: &[QuadVertex::desc(), SpriteInstance::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: fs_entry,
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None, // No culling for 2D sprites
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let sprite = build(
            "Sprite Pipeline",
            &sprite_shader,
            "fs_main",
            wgpu::BlendState::ALPHA_BLENDING,
        );
        let shadow = build(
            "Sprite Shadow Pipeline",
            &sprite_shader,
            "fs_shadow",
            wgpu::BlendState::ALPHA_BLENDING,
        );
        let mask = build("Sprite Mask Pipeline", &sprite_shader, "fs_main", multiply_blend);
        let font = build(
            "Font Pipeline",
            &font_shader,
            "fs_main",
            wgpu::BlendState::ALPHA_BLENDING,
        );

        Self {
            sprite,
            shadow,
            mask,
            font,
            texture_bind_group_layout,
            sprite_globals_buffer,
            sprite_globals_bind_group,
            font_globals_buffer,
            font_globals_bind_group,
        }
    }

    /// Write the sprite-family projection uniform.
    pub fn write_sprite_globals(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        let globals = SpriteGlobals {
            view_proj: view_proj.to_cols_array(),
        };
        queue.write_buffer(&self.sprite_globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Write the font projection and tint uniforms.
    pub fn write_font_globals(&self, queue: &wgpu::Queue, view_proj: Mat4, tint: [f32; 4]) {
        let globals = FontGlobals {
            view_proj: view_proj.to_cols_array(),
            tint,
        };
        queue.write_buffer(&self.font_globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Create a texture bind group for an atlas layer.
    pub fn create_texture_bind_group(
        &self,
        device: &wgpu::Device,
        texture: &Texture,
        label: Option<&str>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}
