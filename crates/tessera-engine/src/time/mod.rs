//! Time subsystem.
//!
//! One `FrameClock` per render loop; `tick()` once per frame. The clock's
//! millisecond timestamps are what the simulation core sees.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
