//! Coordinate spaces shared by the simulation core and the renderer.
//!
//! Grid-local space:
//! - one unit per tile
//! - origin at the bottom-left corner of the grid, +X right, +Y up
//!
//! A [`ClipMatrix`] maps grid-local positions to clip space.

mod clip;

pub use clip::ClipMatrix;
