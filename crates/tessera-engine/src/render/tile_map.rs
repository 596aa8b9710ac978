use super::texture;
use super::{RenderCtx, RenderError};

/// Single-channel texture holding one tile index per grid cell.
///
/// The only GPU resource written every redraw frame.
pub struct TileMapTexture {
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    generation: u64,
}

impl TileMapTexture {
    pub fn new(ctx: &RenderCtx<'_>, width: u32, height: u32) -> Result<Self, RenderError> {
        let (texture, view) = Self::allocate(ctx, width, height)?;
        Ok(Self {
            width,
            height,
            texture,
            view,
            generation: 0,
        })
    }

    fn allocate(
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
    ) -> Result<(wgpu::Texture, wgpu::TextureView), RenderError> {
        let texture = texture::create_texture(
            ctx,
            "tessera tile map",
            width,
            height,
            wgpu::TextureFormat::R8Unorm,
        )?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok((texture, view))
    }

    /// Copies `grid` (row-major, one byte per cell) into the texture.
    ///
    /// Reallocates only when the dimensions change.
    pub fn upload(
        &mut self,
        ctx: &RenderCtx<'_>,
        grid: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if grid.len() != width as usize * height as usize {
            return Err(RenderError::SceneShape {
                width,
                height,
                len: grid.len(),
            });
        }

        if (width, height) != (self.width, self.height) {
            let (texture, view) = Self::allocate(ctx, width, height)?;
            self.texture = texture;
            self.view = view;
            self.width = width;
            self.height = height;
            self.generation += 1;
        }

        texture::write_full(ctx.queue, &self.texture, grid, width, height, 1);
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    /// Copies the texture back as tightly packed bytes.
    pub fn read_back(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u8>, RenderError> {
        texture::read_texture(device, queue, &self.texture, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessGpu;

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn upload_round_trip_width_5() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, wgpu::TextureFormat::Rgba8Unorm);

        let grid: Vec<u8> = vec![3, 0, 7, 1, 2, 9, 8, 6, 5, 4];
        let mut map = TileMapTexture::new(&ctx, 1, 1).unwrap();
        map.upload(&ctx, &grid, 5, 2).unwrap();

        assert_eq!(map.size(), (5, 2));
        assert_eq!(map.read_back(&gpu.device, &gpu.queue).unwrap(), grid);
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn same_size_upload_reuses_texture() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, wgpu::TextureFormat::Rgba8Unorm);

        let mut map = TileMapTexture::new(&ctx, 3, 1).unwrap();
        map.upload(&ctx, &[1, 2, 3], 3, 1).unwrap();
        map.upload(&ctx, &[4, 5, 6], 3, 1).unwrap();

        assert_eq!(map.generation(), 0);
        assert_eq!(map.read_back(&gpu.device, &gpu.queue).unwrap(), vec![4, 5, 6]);
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn length_mismatch_is_rejected() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, wgpu::TextureFormat::Rgba8Unorm);

        let mut map = TileMapTexture::new(&ctx, 2, 2).unwrap();
        let err = map.upload(&ctx, &[1, 2, 3], 2, 2).unwrap_err();

        assert_eq!(
            err,
            RenderError::SceneShape {
                width: 2,
                height: 2,
                len: 3
            }
        );
        assert!(!err.is_fatal());
        assert_eq!(map.size(), (2, 2));
    }
}
