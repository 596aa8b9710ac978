/// One acquired swapchain image plus the encoder recording into it.
///
/// Short-lived: the surface hands out no further images until this one is
/// presented, so acquire it only once there is something to draw.
pub struct SurfaceFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

impl SurfaceFrame {
    pub(super) fn new(surface_texture: wgpu::SurfaceTexture, device: &wgpu::Device) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tessera frame encoder"),
        });
        Self {
            surface_texture,
            view,
            encoder,
        }
    }

    /// Split borrow for building a render pass.
    pub fn encoder_and_view(&mut self) -> (&mut wgpu::CommandEncoder, &wgpu::TextureView) {
        (&mut self.encoder, &self.view)
    }

    pub(super) fn present(self, queue: &wgpu::Queue) {
        let Self {
            surface_texture,
            view,
            encoder,
        } = self;
        queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }
}
