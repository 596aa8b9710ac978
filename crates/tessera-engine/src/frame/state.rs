use crate::render::{GridScale, RenderError, TileBackend};

use super::scene::Scene;

/// What a tick did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// The atlas is still loading; nothing was asked of the simulation.
    Waiting,
    /// Nothing changed; no GPU work was issued.
    Skipped,
    Drawn,
    /// A recoverable error dropped this frame.
    Dropped,
}

/// Renderer-side memory between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Dims the GPU grid geometry is currently allocated for; `0` before
    /// the first resize.
    pub last_grid_width: u32,
    pub last_grid_height: u32,
    pub scale: GridScale,
    /// The current scene has not reached the screen yet; draw the next one
    /// even if it is unchanged.
    pub redraw_pending: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            last_grid_width: 0,
            last_grid_height: 0,
            scale: GridScale::IDENTITY,
            redraw_pending: true,
        }
    }
}

impl RenderState {
    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.last_grid_width, self.last_grid_height)
    }
}

/// Brings the GPU up to date with `scene` and draws it, or does nothing.
///
/// Dims and scale are committed as soon as the backend has been resized, so
/// they always match the allocated geometry even when the draw then fails.
pub fn update_frame<B: TileBackend + ?Sized>(
    state: &mut RenderState,
    backend: &mut B,
    scene: &Scene<'_>,
) -> Result<FrameOutcome, RenderError> {
    scene.validate()?;

    let (width, height) = scene.dims();
    let dims_changed = (width, height) != state.dims();

    if !scene.changed && !dims_changed && !state.redraw_pending {
        log::trace!("frame skipped: scene unchanged");
        return Ok(FrameOutcome::Skipped);
    }

    state.redraw_pending = true;

    let scale = if dims_changed {
        log::debug!(
            "grid resized {}x{} -> {width}x{height}",
            state.last_grid_width,
            state.last_grid_height
        );
        let scale = backend.resize_grid(width, height)?;
        state.last_grid_width = width;
        state.last_grid_height = height;
        state.scale = scale;
        scale
    } else {
        state.scale
    };

    backend.upload_tile_map(scene.grid, width, height)?;
    backend.draw(&scene.clip_matrix, scale)?;

    state.redraw_pending = false;

    Ok(FrameOutcome::Drawn)
}

/// Call-recording backend shared by the frame tests.
#[cfg(test)]
pub(crate) mod spy {
    use crate::coords::ClipMatrix;
    use crate::device::SurfaceErrorAction;
    use crate::render::{AtlasImage, AtlasLayout, GridScale, RenderError, TileBackend};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        InstallAtlas(u32, u32),
        Resize(u32, u32),
        Upload(Vec<u8>, u32, u32),
        Draw(ClipMatrix, GridScale),
    }

    #[derive(Default)]
    pub struct SpyBackend {
        pub calls: Vec<Call>,
        pub fail_install: Option<RenderError>,
        pub fail_resize: Option<RenderError>,
        pub fail_draw: Option<RenderError>,
    }

    impl SpyBackend {
        pub fn gpu_calls(&self) -> usize {
            self.calls.len()
        }

        pub fn surface_lost() -> RenderError {
            RenderError::Surface(SurfaceErrorAction::Reconfigured)
        }
    }

    impl TileBackend for SpyBackend {
        fn install_atlas(&mut self, image: &AtlasImage) -> Result<(), RenderError> {
            if let Some(err) = self.fail_install.take() {
                return Err(err);
            }
            self.calls.push(Call::InstallAtlas(image.width, image.height));
            Ok(())
        }

        fn resize_grid(&mut self, width: u32, height: u32) -> Result<GridScale, RenderError> {
            if let Some(err) = self.fail_resize.take() {
                return Err(err);
            }
            self.calls.push(Call::Resize(width, height));
            Ok(GridScale::for_grid(width, height, AtlasLayout::default()))
        }

        fn upload_tile_map(
            &mut self,
            grid: &[u8],
            width: u32,
            height: u32,
        ) -> Result<(), RenderError> {
            self.calls.push(Call::Upload(grid.to_vec(), width, height));
            Ok(())
        }

        fn draw(&mut self, clip_matrix: &ClipMatrix, scale: GridScale) -> Result<(), RenderError> {
            if let Some(err) = self.fail_draw.take() {
                return Err(err);
            }
            self.calls.push(Call::Draw(*clip_matrix, scale));
            Ok(())
        }
    }
}
