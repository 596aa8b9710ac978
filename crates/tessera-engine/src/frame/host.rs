use anyhow::Context;

use crate::core::{App, AppControl, FrameCtx};
use crate::input::{InputEvent, KeyState, MouseButtonState, PointerButtonEvent, PointerMoveEvent};
use crate::render::{AtlasConfig, ClearColor, RenderContext, RenderCtx, SurfaceBackend};

use super::driver::FrameDriver;
use super::loader::AtlasLoader;
use super::scene::SimulationCore;
use super::state::FrameOutcome;

/// What the host needs beyond the window and GPU settings.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub atlas: AtlasConfig,
    pub clear: ClearColor,
}

/// Connects a [`SimulationCore`] to the window runtime.
///
/// On the first frame it builds the [`RenderContext`] (placeholder atlas
/// bound) and starts the atlas load; from then on every redraw is one
/// [`FrameDriver::tick`].
pub struct TileHost<S> {
    sim: S,
    config: HostConfig,
    context: Option<RenderContext>,
    driver: FrameDriver,
    error: Option<anyhow::Error>,
}

impl<S: SimulationCore> TileHost<S> {
    pub fn new(sim: S, config: HostConfig) -> Self {
        Self {
            sim,
            config,
            context: None,
            driver: FrameDriver::new(),
            error: None,
        }
    }

    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    fn init_context(&mut self, ctx: &FrameCtx<'_, '_>) -> anyhow::Result<()> {
        let rctx = RenderCtx::new(ctx.gpu.device(), ctx.gpu.queue(), ctx.gpu.surface_format());
        let context = RenderContext::new(&rctx, &self.config.atlas)
            .context("failed to create the tile renderer")?;
        self.context = Some(context);

        log::info!("loading atlas from {}", self.config.atlas.path.display());
        self.driver
            .begin_loading(AtlasLoader::spawn(self.config.atlas.path.clone()));
        Ok(())
    }
}

impl<S: SimulationCore> App for TileHost<S> {
    fn on_input(&mut self, event: &InputEvent, timestamp_ms: f64) {
        forward_input(&mut self.sim, event, timestamp_ms);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.context.is_none() {
            if let Err(e) = self.init_context(ctx) {
                self.error = Some(e);
                return AppControl::Exit;
            }
        }
        let Some(context) = self.context.as_mut() else {
            return AppControl::Exit;
        };

        let (width, height) = ctx.window.physical_size();
        if width == 0 || height == 0 {
            log::trace!("window has no area; frame skipped");
            return AppControl::Idle;
        }

        let mut backend = SurfaceBackend {
            gpu: &mut *ctx.gpu,
            context,
            window: ctx.window.window,
            clear: self.config.clear,
        };

        match self
            .driver
            .tick(&mut backend, &mut self.sim, ctx.time.elapsed_ms, width, height)
        {
            Ok(outcome) => control_for(outcome),
            Err(e) => {
                self.error = Some(anyhow::Error::new(e).context("tile renderer failed"));
                AppControl::Exit
            }
        }
    }

    fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }
}

/// Runtime pacing after a successful tick.
///
/// A dropped frame retries immediately; a frame with nothing to show lets
/// the runtime idle.
fn control_for(outcome: FrameOutcome) -> AppControl {
    match outcome {
        FrameOutcome::Drawn | FrameOutcome::Dropped => AppControl::Continue,
        FrameOutcome::Skipped | FrameOutcome::Waiting => AppControl::Idle,
    }
}

/// Routes one input event to the matching simulation callback.
pub fn forward_input<S: SimulationCore + ?Sized>(sim: &mut S, event: &InputEvent, t: f64) {
    match event {
        InputEvent::PointerMoved(PointerMoveEvent { x, y }) => sim.on_mouse_move(t, *x, *y),
        InputEvent::PointerButton(PointerButtonEvent { state, x, y, .. }) => match state {
            MouseButtonState::Pressed => sim.on_mouse_down(t, *x, *y),
            MouseButtonState::Released => sim.on_mouse_up(t, *x, *y),
        },
        InputEvent::Key {
            key,
            state,
            repeat,
            ..
        } => {
            let name = key.to_string();
            match state {
                KeyState::Pressed if !repeat => sim.on_key_down(t, key.legacy_code(), &name),
                KeyState::Pressed => {}
                KeyState::Released => sim.on_key_up(t, key.legacy_code(), &name),
            }
        }
        InputEvent::ModifiersChanged(_) | InputEvent::PointerLeft | InputEvent::Focused(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ClipMatrix;
    use crate::frame::scene::Scene;
    use crate::input::{Key, Modifiers, MouseButton};

    #[derive(Default)]
    struct Recorder {
        grid: Vec<u8>,
        log: Vec<String>,
    }

    impl SimulationCore for Recorder {
        fn render(&mut self, _t: f64, _w: u32, _h: u32) -> Scene<'_> {
            Scene {
                changed: false,
                grid_width: 1,
                grid_height: 1,
                grid: &self.grid,
                clip_matrix: ClipMatrix::IDENTITY,
            }
        }

        fn on_mouse_move(&mut self, t: f64, x: f32, y: f32) {
            self.log.push(format!("move {t} {x} {y}"));
        }

        fn on_mouse_down(&mut self, t: f64, x: f32, y: f32) {
            self.log.push(format!("down {t} {x} {y}"));
        }

        fn on_mouse_up(&mut self, t: f64, x: f32, y: f32) {
            self.log.push(format!("up {t} {x} {y}"));
        }

        fn on_key_down(&mut self, t: f64, code: u32, name: &str) {
            self.log.push(format!("keydown {t} {code} {name}"));
        }

        fn on_key_up(&mut self, t: f64, code: u32, name: &str) {
            self.log.push(format!("keyup {t} {code} {name}"));
        }
    }

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat,
        }
    }

    #[test]
    fn pointer_events_are_forwarded() {
        let mut sim = Recorder::default();
        forward_input(
            &mut sim,
            &InputEvent::PointerMoved(PointerMoveEvent { x: 1.5, y: 2.0 }),
            10.0,
        );
        forward_input(
            &mut sim,
            &InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 3.0,
                y: 4.0,
                modifiers: Modifiers::default(),
            }),
            11.0,
        );
        forward_input(
            &mut sim,
            &InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Released,
                x: 3.0,
                y: 4.0,
                modifiers: Modifiers::default(),
            }),
            12.0,
        );

        assert_eq!(sim.log, vec!["move 10 1.5 2", "down 11 3 4", "up 12 3 4"]);
    }

    #[test]
    fn keys_carry_legacy_code_and_name() {
        let mut sim = Recorder::default();
        forward_input(&mut sim, &key(Key::ArrowLeft, KeyState::Pressed, false), 5.0);
        forward_input(&mut sim, &key(Key::ArrowLeft, KeyState::Released, false), 6.0);

        assert_eq!(sim.log, vec!["keydown 5 37 ArrowLeft", "keyup 6 37 ArrowLeft"]);
    }

    #[test]
    fn repeated_presses_are_dropped() {
        let mut sim = Recorder::default();
        forward_input(&mut sim, &key(Key::Space, KeyState::Pressed, false), 0.0);
        forward_input(&mut sim, &key(Key::Space, KeyState::Pressed, true), 1.0);
        forward_input(&mut sim, &key(Key::Space, KeyState::Pressed, true), 2.0);

        assert_eq!(sim.log, vec!["keydown 0 32 Space"]);
    }

    #[test]
    fn other_events_are_ignored() {
        let mut sim = Recorder::default();
        forward_input(&mut sim, &InputEvent::Focused(true), 0.0);
        forward_input(&mut sim, &InputEvent::PointerLeft, 0.0);
        assert!(sim.log.is_empty());
    }

    // ── pacing ──

    #[test]
    fn idle_frames_let_the_runtime_sleep() {
        assert_eq!(control_for(FrameOutcome::Skipped), AppControl::Idle);
        assert_eq!(control_for(FrameOutcome::Waiting), AppControl::Idle);
        assert_eq!(control_for(FrameOutcome::Drawn), AppControl::Continue);
        assert_eq!(control_for(FrameOutcome::Dropped), AppControl::Continue);
    }

    #[test]
    fn host_starts_uninitialized() {
        let host = TileHost::new(Recorder::default(), HostConfig::default());
        assert_eq!(host.driver().phase(), crate::frame::DriverPhase::Uninitialized);
    }
}
