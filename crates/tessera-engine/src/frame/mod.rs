//! Per-frame driving of the tile renderer.
//!
//! The simulation produces a [`Scene`] each frame; [`update_frame`] turns it
//! into the smallest set of GPU calls on a [`TileBackend`](crate::render::TileBackend),
//! and [`FrameDriver`] sequences that behind the atlas load.

mod driver;
mod host;
mod loader;
mod scene;
mod state;

pub use driver::{DriverPhase, FrameDriver};
pub use host::{forward_input, HostConfig, TileHost};
pub use loader::{AtlasLoader, AtlasResult, LoadPoll};
pub use scene::{Scene, SimulationCore};
pub use state::{update_frame, FrameOutcome, RenderState};
