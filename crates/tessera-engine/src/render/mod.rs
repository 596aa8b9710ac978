//! Tile-grid rendering.
//!
//! One textured quad covers the whole grid; the fragment stage turns each
//! fragment into an atlas texel through three lookup textures (tile map,
//! src-to-origin, origin-to-dest).
//!
//! Convention:
//! - grid-local geometry is in tiles, row 0 at the top of the tile map
//! - all GPU resources live in one [`RenderContext`] created at startup
//! - device and queue are borrowed per call through [`RenderCtx`]

mod atlas;
mod backend;
mod context;
mod ctx;
mod error;
mod geometry;
mod origin_to_dest;
mod pipeline;
mod texture;
mod tile_map;

pub use atlas::{
    AtlasConfig, AtlasImage, AtlasLayout, AtlasLoadError, TileAtlas, PLACEHOLDER_RGBA,
    TILES_HEIGHT, TILES_WIDTH,
};
pub use backend::{ClearColor, OffscreenBackend, SurfaceBackend, TileBackend};
pub use context::RenderContext;
pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderError;
pub use geometry::{quad_vertices, src_to_origin_texels, GridGeometry, GridScale, GridVertex};
pub use origin_to_dest::{origin_to_dest_slot, origin_to_dest_texels, OriginToDestTable};
pub use pipeline::{
    fan_to_triangle_list, link_stages, validate_stage, ShaderPipeline, FAN_INDICES, TILE_GRID_FS,
    TILE_GRID_VS,
};
pub use texture::{padded_bytes_per_row, strip_row_padding};
pub use tile_map::TileMapTexture;
