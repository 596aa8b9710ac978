use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{platform, InputState};
use crate::time::{FrameClock, FrameTime};

/// How long the loop sleeps after a frame that drew nothing.
const IDLE_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tessera".to_string(),
            initial_size: LogicalSize::new(960.0, 540.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    ///
    /// Returns the first fatal error raised during startup or by the app.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take().or_else(|| state.app.take_error()) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    fatal: Option<anyhow::Error>,
    exit_requested: bool,
    /// Set after an idle frame; no redraw is requested before it.
    idle_until: Option<Instant>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            fatal: None,
            exit_requested: false,
            idle_until: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal.get_or_insert(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.window = None;
        event_loop.exit();
    }

    fn redraw(&mut self, window_id: WindowId) -> AppControl {
        let (app, entry) = (&mut self.app, &mut self.window);
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let time: FrameTime = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                input: fields.input_state,
                time,
            };
            app.on_frame(&mut ctx)
        })
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let flow = pacing(self.idle_until, Instant::now());
        event_loop.set_control_flow(flow);
        if flow == ControlFlow::Wait {
            self.idle_until = None;
            if let Some(entry) = &self.window {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            let Some(ev) =
                platform::translate_window_event(fields.window, fields.input_state, &event)
            else {
                return;
            };
            // Presses of an already-held key (auto-repeat) stop here.
            if fields.input_state.apply_event(&ev) {
                app.on_input(&ev, fields.clock.elapsed_ms());
            }
        });
        if !matches!(event, WindowEvent::RedrawRequested) {
            self.idle_until = None;
        }

        match &event {
            WindowEvent::CloseRequested => self.exit(event_loop),

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => match self.redraw(window_id) {
                AppControl::Exit => {
                    if let Some(err) = self.app.take_error() {
                        self.fail(event_loop, err);
                    } else {
                        self.exit(event_loop);
                    }
                }
                AppControl::Idle => {
                    self.idle_until = Some(Instant::now() + IDLE_FRAME_INTERVAL);
                }
                AppControl::Continue => self.idle_until = None,
            },

            _ => {}
        }
    }
}

/// Control flow for the next wait: sleep until an idle deadline that has not
/// passed yet, otherwise wait for the redraw requested right away.
fn pacing(idle_until: Option<Instant>, now: Instant) -> ControlFlow {
    match idle_until {
        Some(deadline) if now < deadline => ControlFlow::WaitUntil(deadline),
        _ => ControlFlow::Wait,
    }
}
