/// Device, queue and target format for one renderer call.
///
/// Nothing in `render` keeps device or queue handles; they are borrowed per
/// call so the same [`super::RenderContext`] can serve a window surface or an
/// offscreen texture.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
        }
    }

    /// Largest width or height any grid-sized texture may have.
    #[inline]
    pub fn max_texture_side(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Where a grid pass records into, and what it clears to first.
///
/// The pass always clears, so the letterbox bars around the grid take
/// `clear` rather than last frame's pixels.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub clear: wgpu::Color,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        clear: wgpu::Color,
    ) -> Self {
        Self {
            encoder,
            color_view,
            clear,
        }
    }
}
