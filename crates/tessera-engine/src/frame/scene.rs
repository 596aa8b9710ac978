use crate::coords::ClipMatrix;
use crate::render::RenderError;

/// One frame's worth of simulation output.
///
/// Borrowed from the simulation core for the duration of a single
/// [`SimulationCore::render`] call; the renderer copies what it needs before
/// the borrow ends.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// True when `grid` differs from the previous frame's.
    pub changed: bool,
    pub grid_width: u32,
    pub grid_height: u32,
    /// Row-major tile indices, one byte per cell.
    pub grid: &'a [u8],
    pub clip_matrix: ClipMatrix,
}

impl Scene<'_> {
    /// Checks that the byte slice matches the declared dimensions.
    pub fn validate(&self) -> Result<(), RenderError> {
        let expected = self.grid_width as usize * self.grid_height as usize;
        if self.grid_width == 0 || self.grid_height == 0 || self.grid.len() != expected {
            return Err(RenderError::SceneShape {
                width: self.grid_width,
                height: self.grid_height,
                len: self.grid.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }
}

/// The external simulation that decides what the grid shows.
///
/// `render` is called once per frame while the driver is running. Input
/// callbacks are fire-and-forget; timestamps are milliseconds since startup.
pub trait SimulationCore {
    fn render(&mut self, timestamp: f64, display_width: u32, display_height: u32) -> Scene<'_>;

    fn on_mouse_move(&mut self, timestamp: f64, x: f32, y: f32) {
        let _ = (timestamp, x, y);
    }

    fn on_mouse_down(&mut self, timestamp: f64, x: f32, y: f32) {
        let _ = (timestamp, x, y);
    }

    fn on_mouse_up(&mut self, timestamp: f64, x: f32, y: f32) {
        let _ = (timestamp, x, y);
    }

    /// Only the first press of a held key is reported.
    fn on_key_down(&mut self, timestamp: f64, key_code: u32, key_name: &str) {
        let _ = (timestamp, key_code, key_name);
    }

    fn on_key_up(&mut self, timestamp: f64, key_code: u32, key_name: &str) {
        let _ = (timestamp, key_code, key_name);
    }
}
