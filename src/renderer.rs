//! The instanced draw emitter.
//!
//! `SpriteRenderer` owns the GPU context, the pass pipelines, and the
//! shared instance buffer. Per frame it executes the [`DrawPlan`]s drained
//! from batchers: one upload per non-empty batch, then one instanced draw
//! call per plan entry, plus shadow/mask composite passes for sheets that
//! carry overlays.

use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::config::BatchConfig;
use crate::gpu::{GpuContext, PassPipelines, SpriteBuffers, Texture};
use crate::metrics::RenderMetrics;
use crate::sprites::atlas::AtlasRegistry;
use crate::sprites::batch::{BatchKind, SpriteBatcher};

/// One acquired surface texture, alive from `begin_frame` to `present`.
pub struct Frame {
    surface: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Owns the device, pipelines, and instance buffer; executes draw plans.
pub struct SpriteRenderer {
    ctx: GpuContext,
    pipelines: PassPipelines,
    buffers: SpriteBuffers,
    config: BatchConfig,
    metrics: RenderMetrics,
    text_tint: [f32; 4],
}

impl SpriteRenderer {
    /// Create a renderer for the given window with default configuration.
    pub async fn new(window: Arc<Window>) -> Self {
        Self::with_config(window, BatchConfig::default()).await
    }

    pub async fn with_config(window: Arc<Window>, config: BatchConfig) -> Self {
        let ctx = GpuContext::new(window).await;
        let pipelines = PassPipelines::new(&ctx.device, ctx.format());
        let buffers = SpriteBuffers::new(&ctx.device, config.initial_instance_capacity);

        Self {
            ctx,
            pipelines,
            buffers,
            config,
            metrics: RenderMetrics::new(),
            text_tint: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Handle window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    /// Current surface size.
    pub fn size(&self) -> (u32, u32) {
        self.ctx.size()
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Tint applied to all text drawn in `Font` batches. Defaults to white.
    pub fn set_text_tint(&mut self, tint: [f32; 4]) {
        self.text_tint = tint;
    }

    pub(crate) fn device(&self) -> &wgpu::Device {
        &self.ctx.device
    }

    pub(crate) fn queue(&self) -> &wgpu::Queue {
        &self.ctx.queue
    }

    pub(crate) fn create_texture_bind_group(
        &self,
        texture: &Texture,
        label: Option<&str>,
    ) -> wgpu::BindGroup {
        self.pipelines
            .create_texture_bind_group(&self.ctx.device, texture, label)
    }

    /// Acquire the next surface texture and reset per-frame metrics.
    pub fn begin_frame(&mut self) -> Result<Frame, wgpu::SurfaceError> {
        self.metrics.begin_frame();
        let surface = self.ctx.surface.get_current_texture()?;
        let view = surface
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Frame { surface, view })
    }

    /// Clear the frame to a solid color.
    pub fn clear(&mut self, frame: &Frame, color: wgpu::Color) {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Drain `batcher` and draw its contents into `frame`.
    ///
    /// An empty batch performs zero uploads and zero draw calls. Buckets
    /// keyed by an id the registry doesn't know are skipped.
    pub fn end_batch(
        &mut self,
        batcher: &mut SpriteBatcher,
        atlases: &AtlasRegistry,
        frame: &Frame,
    ) {
        let plan = batcher.drain(self.config.max_instances_per_draw);
        if plan.is_empty() {
            return;
        }

        match plan.kind {
            BatchKind::Sprite => self
                .pipelines
                .write_sprite_globals(&self.ctx.queue, plan.projection),
            BatchKind::Font => {
                self.pipelines
                    .write_font_globals(&self.ctx.queue, plan.projection, self.text_tint)
            }
        }

        self.buffers
            .upload_instances(&self.ctx.device, &self.ctx.queue, &plan.instances);
        self.metrics.record_buffer_upload();
        self.metrics.record_instances(plan.instances.len());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Batch Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Batch Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_vertex_buffer(0, self.buffers.quad_vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.buffers.instance_buffer.slice(..));
            pass.set_index_buffer(
                self.buffers.quad_index_buffer.slice(..),
                wgpu::IndexFormat::Uint16,
            );

            let indices = 0..self.buffers.quad_index_count;

            for call in &plan.calls {
                let Some(sheet) = atlases.get(call.atlas) else {
                    tracing::debug!("Skipping bucket for unknown atlas {:?}", call.atlas);
                    continue;
                };

                match plan.kind {
                    BatchKind::Font => {
                        pass.set_pipeline(&self.pipelines.font);
                        pass.set_bind_group(0, &self.pipelines.font_globals_bind_group, &[]);
                        pass.set_bind_group(1, sheet.bind_group(), &[]);
                        pass.draw_indexed(indices.clone(), 0, call.range.clone());
                        self.metrics.record_draw_call();
                    }
                    BatchKind::Sprite => {
                        pass.set_pipeline(&self.pipelines.sprite);
                        pass.set_bind_group(0, &self.pipelines.sprite_globals_bind_group, &[]);
                        pass.set_bind_group(1, sheet.bind_group(), &[]);
                        pass.draw_indexed(indices.clone(), 0, call.range.clone());
                        self.metrics.record_draw_call();

                        // Composite passes reuse the uploaded chunk with the
                        // overlay texture and that pass's blend pipeline.
                        if let Some(shadow) = sheet.shadow_bind_group() {
                            pass.set_pipeline(&self.pipelines.shadow);
                            pass.set_bind_group(1, shadow, &[]);
                            pass.draw_indexed(indices.clone(), 0, call.range.clone());
                            self.metrics.record_draw_call();
                        }
                        if let Some(mask) = sheet.mask_bind_group() {
                            pass.set_pipeline(&self.pipelines.mask);
                            pass.set_bind_group(1, mask, &[]);
                            pass.draw_indexed(indices.clone(), 0, call.range.clone());
                            self.metrics.record_draw_call();
                        }
                    }
                }
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Present the frame and close out this frame's metrics.
    pub fn present(&mut self, frame: Frame) {
        frame.surface.present();
        self.metrics.end_frame();
    }
}
