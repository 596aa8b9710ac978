use crate::input::InputEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    /// Work was done; redraw again as soon as possible.
    Continue,
    /// Nothing new reached the screen; the runtime may sleep until the next
    /// frame interval or the next input event.
    Idle,
    Exit,
}

/// Application contract driven by the window runtime.
pub trait App {
    /// Called for each translated input event, stamped with the frame
    /// clock's milliseconds.
    fn on_input(&mut self, event: &InputEvent, timestamp_ms: f64) {
        let _ = (event, timestamp_ms);
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// The error that made the app ask to exit, if any. `Runtime::run`
    /// returns it after the loop has shut down.
    fn take_error(&mut self) -> Option<anyhow::Error> {
        None
    }
}
