//! Owned tile grids for simulation cores.
//!
//! The renderer only ever sees `&[u8]`; this module is a convenience for
//! producers that want to draw into a board before handing it over.

mod tile;
mod tile_grid;

pub use tile::{glyph_for_char, Tile};
pub use tile_grid::{Pos, TileGrid};
