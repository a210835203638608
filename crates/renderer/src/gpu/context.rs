use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use caustics::ViewportState;

use super::target::fit_within;
use crate::types::RendererError;

/// Instance, surface and device wiring for a single window.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    pub max_texture_dimension: u32,
}

impl GpuContext {
    /// Any failure here means the effect cannot run on this machine and is
    /// reported as [`RendererError::Unsupported`].
    pub(crate) fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self, RendererError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target.window_handle().map_err(|err| {
            RendererError::Unsupported(format!("failed to acquire window handle: {err}"))
        })?;
        let display_handle = target.display_handle().map_err(|err| {
            RendererError::Unsupported(format!("failed to acquire display handle: {err}"))
        })?;

        // SAFETY: the window outlives the surface; `WindowState` drops the GPU
        // state before the window.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| RendererError::Unsupported(format!("failed to create surface: {err}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| RendererError::Unsupported(format!("no suitable GPU adapter: {err}")))?;

        let adapter_info = adapter.get_info();
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("causticwall device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| RendererError::Unsupported(format!("failed to create device: {err}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes display-referred colour, so prefer a format that
        // stores it without another transfer curve.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                RendererError::Unsupported("surface reports no texture formats".into())
            })?;
        if surface_format.is_srgb() {
            tracing::warn!(
                ?surface_format,
                "no non-sRGB surface format available; colours will be re-encoded"
            );
        }

        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or(wgpu::PresentMode::AutoVsync);
        tracing::debug!(?present_mode, ?surface_format, "using present mode");

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let max_texture_dimension = device.limits().max_texture_dimension_2d;
        let size = clamp_size(initial_size, max_texture_dimension);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            surface_format,
            max_texture_dimension,
        })
    }

    /// Reconfigures the swapchain; zero-sized (minimised) windows are ignored.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let size = clamp_size(new_size, self.max_texture_dimension);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub(crate) fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn clamp_size(size: PhysicalSize<u32>, max_dimension: u32) -> PhysicalSize<u32> {
    let viewport = ViewportState {
        width: size.width,
        height: size.height,
    };
    let fitted = fit_within(viewport, max_dimension);
    PhysicalSize::new(fitted.width, fitted.height)
}
