use caustics::ViewportState;

/// Low-resolution colour target the caustics pass renders into.
///
/// Sized to the viewport and sampled with linear filtering when blitted to
/// the swapchain, so one texel covers several screen pixels.
pub(crate) struct OffscreenTarget {
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    extent: ViewportState,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        viewport: ViewportState,
        max_dimension: u32,
    ) -> Self {
        let ViewportState { width, height } = fit_within(viewport, max_dimension);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("caustics target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            view,
            bind_group,
            extent: ViewportState { width, height },
        }
    }

    pub fn extent(&self) -> ViewportState {
        self.extent
    }
}

/// Scales `viewport` uniformly so neither axis exceeds `max_dimension`.
pub(crate) fn fit_within(viewport: ViewportState, max_dimension: u32) -> ViewportState {
    let (width, height) = viewport.extent();
    let max_dimension = max_dimension.max(1);
    let longest = width.max(height);
    if longest <= max_dimension {
        return ViewportState { width, height };
    }
    let shrink = |axis: u32| {
        let scaled = u64::from(axis) * u64::from(max_dimension) / u64::from(longest);
        (scaled as u32).clamp(1, max_dimension)
    };
    ViewportState {
        width: shrink(width),
        height: shrink(height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: u32, height: u32) -> ViewportState {
        ViewportState { width, height }
    }

    #[test]
    fn small_viewports_are_untouched() {
        assert_eq!(fit_within(viewport(640, 360), 8192), viewport(640, 360));
        assert_eq!(fit_within(viewport(8192, 10), 8192), viewport(8192, 10));
    }

    #[test]
    fn oversized_viewport_keeps_aspect_ratio() {
        let fitted = fit_within(viewport(16_000, 2_000), 8192);
        assert_eq!(fitted, viewport(8192, 1024));

        let fitted = fit_within(viewport(3_000, 12_000), 4096);
        assert_eq!(fitted, viewport(1024, 4096));
    }

    #[test]
    fn extreme_aspect_never_collapses_an_axis() {
        let fitted = fit_within(viewport(100_000, 3), 2048);
        assert_eq!(fitted, viewport(2048, 1));
    }
}
