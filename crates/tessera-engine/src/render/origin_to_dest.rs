use crate::device::FLOAT_TABLE_FORMAT;

use super::atlas::AtlasLayout;
use super::texture;
use super::{RenderCtx, RenderError};

/// Bytes per `Rgba32Float` texel.
pub(super) const FLOAT_TEXEL_BYTES: u32 = 16;

/// CPU side of the origin-to-dest table: one texel per atlas slot, in a single
/// row, giving that slot's top-left corner in normalized atlas space.
pub fn origin_to_dest_texels(layout: AtlasLayout) -> Vec<[f32; 4]> {
    let cols = layout.columns as f32;
    let rows = layout.rows as f32;

    (0..layout.tile_count())
        .map(|k| {
            let (col, row) = layout.slot(k);
            [col as f32 / cols, row as f32 / rows, 0.0, 0.0]
        })
        .collect()
}

/// Table column the fragment shader reads for tile byte `byte`.
///
/// Bytes past the last slot of a smaller atlas clamp to that slot.
pub fn origin_to_dest_slot(byte: u8, tile_count: u32) -> u32 {
    let index = f32::from(byte) / 255.0;
    let slot = (index * 255.0).round() as u32;
    slot.min(tile_count.saturating_sub(1))
}

/// Lookup texture mapping a tile index to its atlas offset.
///
/// Built once at startup and never written again.
pub struct OriginToDestTable {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl OriginToDestTable {
    pub fn build(ctx: &RenderCtx<'_>, layout: AtlasLayout) -> Result<Self, RenderError> {
        let texels = origin_to_dest_texels(layout);
        let width = layout.tile_count();

        let texture = texture::create_texture(
            ctx,
            "tessera origin-to-dest table",
            width,
            1,
            FLOAT_TABLE_FORMAT,
        )?;
        texture::write_full(
            ctx.queue,
            &texture,
            bytemuck::cast_slice(&texels),
            width,
            1,
            FLOAT_TEXEL_BYTES,
        );

        log::debug!(
            "origin-to-dest table built for {}x{} atlas",
            layout.columns,
            layout.rows
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view })
    }

    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Copies the table back as `[x, y, z, w]` texels.
    pub fn read_back(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<[f32; 4]>, RenderError> {
        let bytes = texture::read_texture(device, queue, &self.texture, FLOAT_TEXEL_BYTES)?;
        Ok(texture::float_texels(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessGpu;

    #[test]
    fn every_slot_maps_to_its_corner() {
        let texels = origin_to_dest_texels(AtlasLayout::default());
        assert_eq!(texels.len(), 256);

        for (k, t) in texels.iter().enumerate() {
            let expected_x = (k % 16) as f32 / 16.0;
            let expected_y = (k / 16) as f32 / 16.0;
            assert_eq!(t[0], expected_x, "x of slot {k}");
            assert_eq!(t[1], expected_y, "y of slot {k}");
            assert_eq!(t[2], 0.0);
            assert_eq!(t[3], 0.0);
        }
    }

    #[test]
    fn non_square_layout() {
        let texels = origin_to_dest_texels(AtlasLayout {
            columns: 4,
            rows: 2,
        });
        assert_eq!(texels.len(), 8);
        assert_eq!(texels[5], [0.25, 0.5, 0.0, 0.0]);
        assert_eq!(texels[7], [0.75, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn slot_lookup_follows_table_width() {
        let layout = AtlasLayout {
            columns: 4,
            rows: 2,
        };
        let texels = origin_to_dest_texels(layout);

        let slot = origin_to_dest_slot(5, layout.tile_count());
        assert_eq!(slot, 5);
        assert_eq!(texels[slot as usize], [0.25, 0.5, 0.0, 0.0]);

        assert_eq!(origin_to_dest_slot(200, layout.tile_count()), 7);
        assert_eq!(origin_to_dest_slot(0, layout.tile_count()), 0);
    }

    #[test]
    fn every_byte_hits_its_own_slot_in_full_atlas() {
        let count = AtlasLayout::default().tile_count();
        for byte in 0..=u8::MAX {
            assert_eq!(origin_to_dest_slot(byte, count), u32::from(byte));
        }
    }

    // ── GPU ──

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn gpu_table_matches_cpu_texels() {
        let gpu = HeadlessGpu::try_block_on().expect("GPU adapter");
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, wgpu::TextureFormat::Rgba8Unorm);

        let layout = AtlasLayout::default();
        let table = OriginToDestTable::build(&ctx, layout).unwrap();
        let read = table.read_back(&gpu.device, &gpu.queue).unwrap();

        assert_eq!(read, origin_to_dest_texels(layout));
    }
}
