//! GPU device and swapchain.
//!
//! Startup checks the adapter can sample float lookup tables and hold the
//! largest configured grid before any pipeline resource exists. Per frame,
//! the window surface hands out one [`SurfaceFrame`] and maps acquire
//! failures to a [`SurfaceErrorAction`].

mod caps;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;

pub use caps::{limits_for_grid, require_float_tables, FLOAT_TABLE_FORMAT};
pub use frame::SurfaceFrame;
pub use gpu::Gpu;
pub use headless::HeadlessGpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
