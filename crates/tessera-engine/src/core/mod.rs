//! Core engine-facing contracts.
//!
//! The stable interface between the window runtime and whatever drives the
//! frames (the tile host, or a custom app).

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
