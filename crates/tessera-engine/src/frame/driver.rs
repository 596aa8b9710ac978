use crate::render::{RenderError, TileBackend};

use super::loader::{AtlasLoader, LoadPoll};
use super::scene::SimulationCore;
use super::state::{update_frame, FrameOutcome, RenderState};

/// Lifecycle of the frame driver.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverPhase {
    /// GPU resources exist with the placeholder atlas; no load started yet.
    Uninitialized,
    /// Waiting for the atlas image. No frames are rendered.
    AtlasLoading,
    Running,
}

/// Per-frame loop: pulls a scene from the simulation and hands it to the
/// backend, doing as little GPU work as the scene allows.
pub struct FrameDriver {
    phase: DriverPhase,
    state: RenderState,
    loader: Option<AtlasLoader>,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            phase: DriverPhase::Uninitialized,
            state: RenderState::default(),
            loader: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    #[inline]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Starts waiting on `loader`. Ignored unless uninitialized.
    pub fn begin_loading(&mut self, loader: AtlasLoader) {
        if self.phase != DriverPhase::Uninitialized {
            log::warn!("atlas load requested in phase {:?}; ignored", self.phase);
            return;
        }
        self.loader = Some(loader);
        self.phase = DriverPhase::AtlasLoading;
        log::debug!("atlas loading");
    }

    /// Runs one tick.
    ///
    /// Returns `Err` only for fatal errors; recoverable ones are logged and
    /// reported as [`FrameOutcome::Dropped`].
    pub fn tick<B, S>(
        &mut self,
        backend: &mut B,
        sim: &mut S,
        timestamp: f64,
        display_width: u32,
        display_height: u32,
    ) -> Result<FrameOutcome, RenderError>
    where
        B: TileBackend + ?Sized,
        S: SimulationCore + ?Sized,
    {
        match self.phase {
            DriverPhase::Uninitialized => return Ok(FrameOutcome::Waiting),
            DriverPhase::AtlasLoading => {
                if !self.poll_atlas(backend) {
                    return Ok(FrameOutcome::Waiting);
                }
            }
            DriverPhase::Running => {}
        }

        let scene = sim.render(timestamp, display_width, display_height);

        match update_frame(&mut self.state, backend, &scene) {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_fatal() => {
                log::error!("fatal render error: {e}");
                Err(e)
            }
            Err(e) => {
                log::error!("frame dropped: {e}");
                Ok(FrameOutcome::Dropped)
            }
        }
    }

    /// Returns true once the driver has moved to `Running`.
    ///
    /// A sheet that fails to decode or upload leaves the placeholder bound;
    /// the atlas never stops the driver.
    fn poll_atlas<B: TileBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        let Some(loader) = self.loader.as_ref() else {
            self.phase = DriverPhase::Running;
            return true;
        };

        let result = match loader.poll() {
            LoadPoll::Pending => return false,
            LoadPoll::Ready(result) => result,
        };
        self.loader = None;

        match result {
            Ok(image) => {
                if let Err(e) = backend.install_atlas(&image) {
                    log::warn!("atlas upload failed, keeping placeholder: {e}");
                }
            }
            Err(e) => log::warn!("atlas unavailable, keeping placeholder: {e}"),
        }

        self.phase = DriverPhase::Running;
        log::info!("frame driver running");
        true
    }
}
