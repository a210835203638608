use std::time::{Duration, Instant};

use caustics::{FrameParameters, ViewportState};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;

use crate::types::RendererError;

use super::context::GpuContext;
use super::pipeline::{BlitPipeline, CausticsPipeline, QuadGeometry};
use super::target::OffscreenTarget;
use super::uniforms::CausticsUniforms;

/// Everything needed to draw one caustics frame into a window.
pub(crate) struct GpuState {
    context: GpuContext,
    quad: QuadGeometry,
    caustics: CausticsPipeline,
    blit: BlitPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    target: OffscreenTarget,
    stats: FrameStats,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        surface_size: PhysicalSize<u32>,
        viewport: ViewportState,
    ) -> Result<Self, RendererError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, surface_size)?;
        let device = &context.device;

        let quad = QuadGeometry::new(device)?;
        let caustics = CausticsPipeline::new(device, &quad, context.surface_format)?;
        let blit = BlitPipeline::new(device, &quad, context.surface_format)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("caustics uniforms"),
            size: std::mem::size_of::<CausticsUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("caustics uniform bind group"),
            layout: &caustics.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let target = OffscreenTarget::new(
            device,
            context.surface_format,
            &blit.texture_layout,
            &blit.sampler,
            viewport,
            context.max_texture_dimension,
        );

        Ok(Self {
            context,
            quad,
            caustics,
            blit,
            uniform_buffer,
            uniform_bind_group,
            target,
            stats: FrameStats::new(Instant::now()),
        })
    }

    /// Swapchain follows the window's physical size.
    pub(crate) fn resize_surface(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    /// Recreates the offscreen target; callers only invoke this on change.
    pub(crate) fn resize_viewport(&mut self, viewport: ViewportState) {
        self.target = OffscreenTarget::new(
            &self.context.device,
            self.context.surface_format,
            &self.blit.texture_layout,
            &self.blit.sampler,
            viewport,
            self.context.max_texture_dimension,
        );
        debug!(
            width = self.target.extent().width,
            height = self.target.extent().height,
            "recreated caustics target"
        );
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    pub(crate) fn render(&mut self, params: &FrameParameters) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let mut uniforms = CausticsUniforms::from_frame(params);
        uniforms.resolution = self.target.extent().as_vec2().to_array();
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        self.encode_pass(
            &mut encoder,
            "caustics pass",
            &self.target.view,
            &self.caustics.pipeline,
            &self.uniform_bind_group,
        );
        self.encode_pass(
            &mut encoder,
            "blit pass",
            &surface_view,
            &self.blit.pipeline,
            &self.target.bind_group,
        );

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        if let Some(fps) = self.stats.record(Instant::now()) {
            debug!(
                fps = fps.round(),
                frame_count = self.stats.frame_count,
                time = params.elapsed_seconds,
                "render stats"
            );
        }
        Ok(())
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &'static str,
        view: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad.buffer.slice(..));
        render_pass.draw(0..self.quad.vertex_count, 0..1);
    }
}

/// Once-per-second frame rate bookkeeping for the debug log.
#[derive(Debug, Clone)]
struct FrameStats {
    frame_count: u64,
    frames_since_update: u32,
    last_update: Instant,
}

impl FrameStats {
    fn new(now: Instant) -> Self {
        Self {
            frame_count: 0,
            frames_since_update: 0,
            last_update: now,
        }
    }

    /// Returns the measured rate when a full second has elapsed.
    fn record(&mut self, now: Instant) -> Option<f32> {
        self.frame_count += 1;
        self.frames_since_update += 1;
        let elapsed = now.saturating_duration_since(self.last_update);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames_since_update as f32 / elapsed.as_secs_f32();
        if fps < 1.0 {
            warn!(fps, "render loop is running below one frame per second");
        }
        self.frames_since_update = 0;
        self.last_update = now;
        Some(fps)
    }
}
