use winit::window::Window;

use crate::coords::ClipMatrix;
use crate::device::Gpu;

use super::atlas::AtlasImage;
use super::context::RenderContext;
use super::geometry::GridScale;
use super::texture;
use super::{RenderCtx, RenderError, RenderTarget};

/// Background colour behind the grid (letterbox bars included).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
        }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// GPU operations the frame driver needs, one call per step.
pub trait TileBackend {
    fn install_atlas(&mut self, image: &AtlasImage) -> Result<(), RenderError>;

    /// Rebuilds grid-sized resources and returns the matching scale.
    fn resize_grid(&mut self, width: u32, height: u32) -> Result<GridScale, RenderError>;

    fn upload_tile_map(&mut self, grid: &[u8], width: u32, height: u32)
    -> Result<(), RenderError>;

    fn draw(&mut self, clip_matrix: &ClipMatrix, scale: GridScale) -> Result<(), RenderError>;
}

// ── window surface ────────────────────────────────────────────────────────

/// Draws into the window's swapchain. Borrowed for one frame.
pub struct SurfaceBackend<'a, 'w> {
    pub gpu: &'a mut Gpu<'w>,
    pub context: &'a mut RenderContext,
    pub window: &'a Window,
    pub clear: ClearColor,
}

impl TileBackend for SurfaceBackend<'_, '_> {
    fn install_atlas(&mut self, image: &AtlasImage) -> Result<(), RenderError> {
        let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
        self.context.install_atlas(&ctx, image)
    }

    fn resize_grid(&mut self, width: u32, height: u32) -> Result<GridScale, RenderError> {
        let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
        self.context.resize_grid(&ctx, width, height)
    }

    fn upload_tile_map(
        &mut self,
        grid: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
        self.context.upload_tile_map(&ctx, grid, width, height)
    }

    fn draw(&mut self, clip_matrix: &ClipMatrix, scale: GridScale) -> Result<(), RenderError> {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => return Err(RenderError::Surface(self.gpu.handle_surface_error(err))),
        };

        {
            let ctx = RenderCtx::new(
                self.gpu.device(),
                self.gpu.queue(),
                self.gpu.surface_format(),
            );
            let (encoder, view) = frame.encoder_and_view();
            let mut target = RenderTarget::new(encoder, view, self.clear.to_wgpu());
            self.context.draw(&ctx, &mut target, clip_matrix, scale);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);
        Ok(())
    }
}

// ── offscreen target ──────────────────────────────────────────────────────

/// Draws into an owned texture; used for headless rendering and readback.
pub struct OffscreenBackend<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    context: RenderContext,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    clear: ClearColor,
}

impl<'a> OffscreenBackend<'a> {
    pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        atlas: &super::AtlasConfig,
        width: u32,
        height: u32,
        clear: ClearColor,
    ) -> Result<Self, RenderError> {
        let ctx = RenderCtx::new(device, queue, Self::TARGET_FORMAT);
        texture::check_extent(&ctx, "tessera offscreen target", width, height)?;

        let context = RenderContext::new(&ctx, atlas)?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            device,
            queue,
            context,
            target,
            target_view,
            clear,
        })
    }

    fn ctx(&self) -> RenderCtx<'a> {
        RenderCtx::new(self.device, self.queue, Self::TARGET_FORMAT)
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// RGBA8 pixels of the target, row-major from the top-left.
    pub fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        texture::read_texture(self.device, self.queue, &self.target, 4)
    }
}

impl TileBackend for OffscreenBackend<'_> {
    fn install_atlas(&mut self, image: &AtlasImage) -> Result<(), RenderError> {
        let ctx = self.ctx();
        self.context.install_atlas(&ctx, image)
    }

    fn resize_grid(&mut self, width: u32, height: u32) -> Result<GridScale, RenderError> {
        let ctx = self.ctx();
        self.context.resize_grid(&ctx, width, height)
    }

    fn upload_tile_map(
        &mut self,
        grid: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let ctx = self.ctx();
        self.context.upload_tile_map(&ctx, grid, width, height)
    }

    fn draw(&mut self, clip_matrix: &ClipMatrix, scale: GridScale) -> Result<(), RenderError> {
        let ctx = self.ctx();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera offscreen encoder"),
            });

        {
            let mut target =
                RenderTarget::new(&mut encoder, &self.target_view, self.clear.to_wgpu());
            self.context.draw(&ctx, &mut target, clip_matrix, scale);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessGpu;
    use crate::render::{AtlasConfig, AtlasLayout};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    /// 32×32 sheet of 2×2-pixel tiles: tile 5 red, tile 0 blue, the rest green.
    fn test_atlas() -> AtlasImage {
        let mut pixels = Vec::with_capacity(32 * 32 * 4);
        for y in 0..32u32 {
            for x in 0..32u32 {
                let tile = (y / 2) * 16 + x / 2;
                let c = match tile {
                    5 => RED,
                    0 => BLUE,
                    _ => GREEN,
                };
                pixels.extend_from_slice(&c);
            }
        }
        AtlasImage::from_rgba(32, 32, pixels).unwrap()
    }

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn clear_color_converts() {
        let c = ClearColor {
            r: 0.5,
            g: 0.25,
            b: 0.0,
            a: 1.0,
        }
        .to_wgpu();
        assert_eq!((c.r, c.g, c.b, c.a), (0.5, 0.25, 0.0, 1.0));
        assert_eq!(ClearColor::default(), ClearColor::BLACK);
    }

    // ── GPU ──

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn two_cell_grid_draws_each_tile() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let atlas = AtlasConfig::default();
        let mut backend =
            OffscreenBackend::new(&gpu.device, &gpu.queue, &atlas, 8, 4, ClearColor::BLACK)
                .unwrap();

        backend.install_atlas(&test_atlas()).unwrap();
        let scale = backend.resize_grid(2, 1).unwrap();
        assert_eq!(scale, GridScale::for_grid(2, 1, AtlasLayout::default()));
        backend.upload_tile_map(&[5, 0], 2, 1).unwrap();
        backend
            .draw(&ClipMatrix::orthographic_2d(0.0, 2.0, 0.0, 1.0), scale)
            .unwrap();

        let pixels = backend.read_pixels().unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(pixel(&pixels, 8, x, y), RED, "left cell at ({x},{y})");
                assert_eq!(pixel(&pixels, 8, x + 4, y), BLUE, "right cell at ({},{y})", x + 4);
            }
        }
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn placeholder_colours_every_tile() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let atlas = AtlasConfig {
            placeholder: [255, 255, 0, 255],
            ..AtlasConfig::default()
        };
        let mut backend =
            OffscreenBackend::new(&gpu.device, &gpu.queue, &atlas, 4, 4, ClearColor::BLACK)
                .unwrap();
        assert!(backend.context().atlas().is_placeholder());

        let scale = backend.resize_grid(2, 2).unwrap();
        backend.upload_tile_map(&[1, 17, 200, 3], 2, 2).unwrap();
        backend
            .draw(&ClipMatrix::orthographic_2d(0.0, 2.0, 0.0, 2.0), scale)
            .unwrap();

        let pixels = backend.read_pixels().unwrap();
        assert!(pixels.chunks_exact(4).all(|p| p == [255, 255, 0, 255]));
    }
}
