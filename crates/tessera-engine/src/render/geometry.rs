use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::device::FLOAT_TABLE_FORMAT;

use super::atlas::AtlasLayout;
use super::origin_to_dest::FLOAT_TEXEL_BYTES;
use super::texture;
use super::{RenderCtx, RenderError};

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GridVertex {
    /// Grid-local position, in tiles.
    pub position: [f32; 2],
    /// Normalized tile-map coordinate (V flipped).
    pub tile_map_coord: [f32; 2],
}

impl GridVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The four corners of a `width × height` grid, in fan order.
pub fn quad_vertices(width: u32, height: u32) -> [GridVertex; 4] {
    let w = width as f32;
    let h = height as f32;
    [
        GridVertex {
            position: [0.0, 0.0],
            tile_map_coord: [0.0, 1.0],
        },
        GridVertex {
            position: [w, 0.0],
            tile_map_coord: [1.0, 1.0],
        },
        GridVertex {
            position: [w, h],
            tile_map_coord: [1.0, 0.0],
        },
        GridVertex {
            position: [0.0, h],
            tile_map_coord: [0.0, 0.0],
        },
    ]
}

// ── scale ─────────────────────────────────────────────────────────────────

/// Diagonal of the 2×2 scale uniform: grid dims over atlas dims.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridScale {
    pub x: f32,
    pub y: f32,
}

impl GridScale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub fn for_grid(width: u32, height: u32, layout: AtlasLayout) -> Self {
        Self {
            x: width as f32 / layout.columns as f32,
            y: height as f32 / layout.rows as f32,
        }
    }

    /// Column-major `mat2x2<f32>` as laid out in a uniform buffer.
    #[inline]
    pub fn as_mat2(self) -> [f32; 4] {
        [self.x, 0.0, 0.0, self.y]
    }
}

impl Default for GridScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── src-to-origin table ───────────────────────────────────────────────────

/// CPU side of the src-to-origin table, row-major.
///
/// Texel `(j, i)` holds `(-j / width, -i / height)`: adding it to the tile-map
/// coordinate of any point inside cell `(j, i)` gives that point's offset
/// from the cell's own corner.
pub fn src_to_origin_texels(width: u32, height: u32) -> Vec<[f32; 4]> {
    let w = width as f32;
    let h = height as f32;
    let mut out = Vec::with_capacity(width as usize * height as usize);
    for i in 0..height {
        for j in 0..width {
            out.push([-(j as f32) / w, -(i as f32) / h, 0.0, 0.0]);
        }
    }
    out
}

// ── geometry ──────────────────────────────────────────────────────────────

/// Quad vertex buffer plus the src-to-origin table, both sized to the grid.
pub struct GridGeometry {
    width: u32,
    height: u32,
    vertices: [GridVertex; 4],
    vertex_buffer: wgpu::Buffer,
    table: wgpu::Texture,
    table_view: wgpu::TextureView,
    generation: u64,
}

impl GridGeometry {
    /// Geometry for a `width × height` grid.
    pub fn new(ctx: &RenderCtx<'_>, width: u32, height: u32) -> Result<Self, RenderError> {
        let (table, table_view) = Self::build_table(ctx, width, height)?;
        let vertices = quad_vertices(width, height);

        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tessera grid vbo"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });

        Ok(Self {
            width,
            height,
            vertices,
            vertex_buffer,
            table,
            table_view,
            generation: 0,
        })
    }

    /// Rebuilds the quad and src-to-origin table for new dimensions.
    ///
    /// On error nothing has been replaced and the previous size stays in use.
    pub fn resize(
        &mut self,
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
        layout: AtlasLayout,
    ) -> Result<GridScale, RenderError> {
        let (table, table_view) = Self::build_table(ctx, width, height)?;

        self.vertices = quad_vertices(width, height);
        ctx.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));

        self.table = table;
        self.table_view = table_view;
        self.width = width;
        self.height = height;
        self.generation += 1;

        log::debug!("grid geometry resized to {width}x{height}");
        Ok(GridScale::for_grid(width, height, layout))
    }

    fn build_table(
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
    ) -> Result<(wgpu::Texture, wgpu::TextureView), RenderError> {
        let table = texture::create_texture(
            ctx,
            "tessera src-to-origin table",
            width,
            height,
            FLOAT_TABLE_FORMAT,
        )?;
        let texels = src_to_origin_texels(width, height);
        texture::write_full(
            ctx.queue,
            &table,
            bytemuck::cast_slice(&texels),
            width,
            height,
            FLOAT_TEXEL_BYTES,
        );
        let view = table.create_view(&wgpu::TextureViewDescriptor::default());
        Ok((table, view))
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// CPU copy of what the vertex buffer currently holds.
    #[inline]
    pub fn vertices(&self) -> &[GridVertex; 4] {
        &self.vertices
    }

    pub(super) fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub(super) fn table_view(&self) -> &wgpu::TextureView {
        &self.table_view
    }

    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    pub fn read_back_table(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<[f32; 4]>, RenderError> {
        let bytes = texture::read_texture(device, queue, &self.table, FLOAT_TEXEL_BYTES)?;
        Ok(texture::float_texels(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessGpu;

    fn span(v: &[GridVertex; 4]) -> ([f32; 2], [f32; 2]) {
        let mut min = [f32::MAX; 2];
        let mut max = [f32::MIN; 2];
        for vert in v {
            for a in 0..2 {
                min[a] = min[a].min(vert.position[a]);
                max[a] = max[a].max(vert.position[a]);
            }
        }
        (min, max)
    }

    // ── quad ──

    #[test]
    fn quad_spans_the_grid() {
        let v = quad_vertices(12, 22);
        assert_eq!(span(&v), ([0.0, 0.0], [12.0, 22.0]));
    }

    #[test]
    fn quad_tile_map_coords_are_flipped() {
        let v = quad_vertices(3, 2);
        assert_eq!(v[0].tile_map_coord, [0.0, 1.0]);
        assert_eq!(v[1].tile_map_coord, [1.0, 1.0]);
        assert_eq!(v[2].tile_map_coord, [1.0, 0.0]);
        assert_eq!(v[3].tile_map_coord, [0.0, 0.0]);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<GridVertex>(), 16);
    }

    // ── scale ──

    #[test]
    fn scale_for_12_by_22() {
        let s = GridScale::for_grid(12, 22, AtlasLayout::default());
        assert_eq!(s, GridScale { x: 0.75, y: 1.375 });
        assert_eq!(s.as_mat2(), [0.75, 0.0, 0.0, 1.375]);
    }

    // ── src-to-origin ──

    #[test]
    fn src_to_origin_texels_for_various_sizes() {
        for (w, h) in [(1, 1), (2, 1), (5, 3), (10, 20), (48, 27)] {
            let texels = src_to_origin_texels(w, h);
            assert_eq!(texels.len(), (w * h) as usize);
            for i in 0..h {
                for j in 0..w {
                    let t = texels[(i * w + j) as usize];
                    assert_eq!(t[0], -(j as f32) / w as f32);
                    assert_eq!(t[1], -(i as f32) / h as f32);
                    assert_eq!(t[2], 0.0);
                }
            }
        }
    }

    #[test]
    fn first_texel_is_zero() {
        assert_eq!(src_to_origin_texels(7, 9)[0], [0.0, -0.0, 0.0, 0.0]);
    }

    // ── GPU ──

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn resize_10x20_to_12x22() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, wgpu::TextureFormat::Rgba8Unorm);
        let layout = AtlasLayout::default();

        let mut geometry = GridGeometry::new(&ctx, 10, 20).unwrap();
        let scale = geometry.resize(&ctx, 12, 22, layout).unwrap();

        assert_eq!(geometry.size(), (12, 22));
        assert_eq!(span(geometry.vertices()), ([0.0, 0.0], [12.0, 22.0]));
        assert_eq!(scale, GridScale { x: 0.75, y: 1.375 });

        let table = geometry.read_back_table(&gpu.device, &gpu.queue).unwrap();
        assert_eq!(table, src_to_origin_texels(12, 22));
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn oversized_resize_keeps_previous_geometry() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, wgpu::TextureFormat::Rgba8Unorm);

        let mut geometry = GridGeometry::new(&ctx, 4, 4).unwrap();
        let too_wide = gpu.device.limits().max_texture_dimension_2d + 1;

        let err = geometry
            .resize(&ctx, too_wide, 4, AtlasLayout::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Allocation { .. }));
        assert!(err.is_fatal());
        assert_eq!(geometry.size(), (4, 4));
        assert_eq!(geometry.generation(), 0);
    }
}
