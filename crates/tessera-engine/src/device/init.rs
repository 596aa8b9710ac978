/// GPU settings for the windowed renderer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Ask for an sRGB swapchain so atlas bytes reach the screen unchanged.
    pub prefer_srgb: bool,

    /// FIFO paces the frame loop to the display and is always available.
    pub present_mode: wgpu::PresentMode,

    /// Falls back to `Opaque` (or whatever the surface offers) when unset
    /// or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// Largest grid width or height the device must accept.
    ///
    /// The tile map and src-to-origin table are grid-sized, so this becomes
    /// the requested `max_texture_dimension_2d`. Startup fails if the
    /// adapter cannot provide it.
    pub max_grid_side: u32,

    /// Hint only; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            max_grid_side: wgpu::Limits::default().max_texture_dimension_2d,
            desired_maximum_frame_latency: 2,
        }
    }
}
