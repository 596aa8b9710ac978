use anyhow::{Context, Result};

use super::caps;

/// Device + queue without a surface.
///
/// Used for texture readback and for exercising the pipeline off-screen.
pub struct HeadlessGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl HeadlessGpu {
    /// Requests any adapter that can sample float tables.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter available")?;

        caps::require_float_tables(&adapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera headless device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create headless device/queue")?;

        Ok(Self { device, queue })
    }

    /// Blocking variant of [`HeadlessGpu::new`]; `None` when no usable adapter exists.
    pub fn try_block_on() -> Option<Self> {
        match pollster::block_on(Self::new()) {
            Ok(gpu) => Some(gpu),
            Err(e) => {
                log::warn!("headless GPU unavailable: {e:#}");
                None
            }
        }
    }
}
