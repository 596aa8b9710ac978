use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::caps;
use super::surface::{SurfaceOptions, SurfaceSlot};
use super::{GpuInit, SurfaceErrorAction, SurfaceFrame};

/// Device, queue and the window's swapchain.
///
/// Borrows the window for `'w`; the runtime keeps both in one
/// self-referential entry so the surface never outlives it.
pub struct Gpu<'w> {
    /// Kept alive for the surface; never read after startup.
    #[allow(dead_code)]
    instance: wgpu::Instance,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: SurfaceSlot<'w>,
}

impl<'w> Gpu<'w> {
    /// Brings up a device able to run the tile pipeline on `window`.
    ///
    /// Fails when no adapter is available or the adapter cannot sample
    /// float lookup tables; there is no fallback renderer.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            max_grid_side,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        caps::require_float_tables(&adapter)?;
        let required_limits = caps::limits_for_grid(&adapter, max_grid_side)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        device.set_device_lost_callback(|reason, message| {
            // No re-initialization path; frames keep failing and are dropped.
            log::error!("GPU device lost ({reason:?}): {message}");
        });

        let surface = SurfaceSlot::configure(
            surface,
            &adapter,
            &device,
            size,
            SurfaceOptions {
                prefer_srgb,
                present_mode,
                alpha_mode,
                desired_maximum_frame_latency,
            },
        )?;

        Ok(Self {
            instance,
            device,
            queue,
            surface,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    /// Drawable size in physical pixels; may be zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(&self.device, new_size);
    }

    /// Acquires the next swapchain image with a fresh encoder.
    pub fn begin_frame(&self) -> std::result::Result<SurfaceFrame, SurfaceError> {
        self.surface.acquire(&self.device)
    }

    /// Submits the frame's commands and presents it.
    pub fn submit(&self, frame: SurfaceFrame) {
        frame.present(&self.queue);
    }

    /// Recovers from a failed acquire where possible.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        self.surface.recover(&self.device, &err)
    }
}
