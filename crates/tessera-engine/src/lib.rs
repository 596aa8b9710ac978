//! Tessera engine crate.
//!
//! Renders a tile grid produced by a simulation core: one quad, one
//! tile-map texture per frame, and a fixed atlas resolved in the fragment
//! stage. Also owns the window runtime and GPU device plumbing around it.

pub mod core;
pub mod coords;
pub mod device;
pub mod frame;
pub mod grid;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
