use crate::coords::ClipMatrix;

use super::atlas::{AtlasConfig, AtlasImage, AtlasLayout, TileAtlas};
use super::geometry::{GridGeometry, GridScale};
use super::origin_to_dest::OriginToDestTable;
use super::pipeline::{ShaderPipeline, TILE_GRID_FS, TILE_GRID_VS};
use super::texture;
use super::tile_map::TileMapTexture;
use super::{RenderCtx, RenderError, RenderTarget};

/// Every GPU resource the tile grid needs, created once at startup.
///
/// Device and queue are not stored; each call borrows them through a
/// [`RenderCtx`].
pub struct RenderContext {
    pipeline: ShaderPipeline,
    atlas: TileAtlas,
    origin_to_dest: OriginToDestTable,
    geometry: GridGeometry,
    tile_map: TileMapTexture,
    sampler: wgpu::Sampler,

    bind_group: Option<wgpu::BindGroup>,
    /// `(atlas, geometry, tile map)` generations the bind group was built for.
    bound_generations: (u64, u64, u64),
}

impl RenderContext {
    /// Builds the pipeline, the placeholder atlas and the static tables.
    ///
    /// Grid resources start at 1×1 until the first scene resizes them.
    pub fn new(ctx: &RenderCtx<'_>, atlas: &AtlasConfig) -> Result<Self, RenderError> {
        let pipeline = ShaderPipeline::initialize(ctx, TILE_GRID_VS, TILE_GRID_FS)?;
        let tile_atlas = TileAtlas::placeholder(ctx, atlas.layout, atlas.placeholder)?;
        let origin_to_dest = OriginToDestTable::build(ctx, atlas.layout)?;
        let geometry = GridGeometry::new(ctx, 1, 1)?;
        let tile_map = TileMapTexture::new(ctx, 1, 1)?;
        let sampler = texture::nearest_clamp_sampler(ctx.device);

        log::info!(
            "render context ready ({}x{} atlas slots, target {:?})",
            atlas.layout.columns,
            atlas.layout.rows,
            ctx.surface_format
        );

        Ok(Self {
            pipeline,
            atlas: tile_atlas,
            origin_to_dest,
            geometry,
            tile_map,
            sampler,
            bind_group: None,
            bound_generations: (0, 0, 0),
        })
    }

    #[inline]
    pub fn layout(&self) -> AtlasLayout {
        self.atlas.layout()
    }

    #[inline]
    pub fn atlas(&self) -> &TileAtlas {
        &self.atlas
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    pub fn tile_map(&self) -> &TileMapTexture {
        &self.tile_map
    }

    #[inline]
    pub fn origin_to_dest(&self) -> &OriginToDestTable {
        &self.origin_to_dest
    }

    /// Swaps the placeholder for the decoded sheet.
    pub fn install_atlas(
        &mut self,
        ctx: &RenderCtx<'_>,
        image: &AtlasImage,
    ) -> Result<(), RenderError> {
        self.atlas.replace(ctx, image)
    }

    pub fn resize_grid(
        &mut self,
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
    ) -> Result<GridScale, RenderError> {
        self.geometry.resize(ctx, width, height, self.atlas.layout())
    }

    pub fn upload_tile_map(
        &mut self,
        ctx: &RenderCtx<'_>,
        grid: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        self.tile_map.upload(ctx, grid, width, height)
    }

    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        clip_matrix: &ClipMatrix,
        scale: GridScale,
    ) {
        self.ensure_bind_group(ctx);
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        self.pipeline.draw(
            ctx,
            target,
            bind_group,
            self.geometry.vertex_buffer(),
            clip_matrix,
            scale,
        );
    }

    fn ensure_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        let generations = (
            self.atlas.generation(),
            self.geometry.generation(),
            self.tile_map.generation(),
        );
        if self.bind_group.is_some() && self.bound_generations == generations {
            return;
        }

        self.bind_group = Some(self.pipeline.create_texture_bind_group(
            ctx.device,
            self.atlas.view(),
            self.tile_map.view(),
            self.geometry.table_view(),
            self.origin_to_dest.view(),
            &self.sampler,
        ));
        self.bound_generations = generations;
    }
}
