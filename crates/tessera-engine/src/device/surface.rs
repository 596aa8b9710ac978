use std::fmt;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::frame::SurfaceFrame;

/// What the frame loop does after the swapchain refused an image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the scene is redrawn next frame.
    Reconfigured,
    /// Transient; only this frame is dropped.
    SkipFrame,
    /// Out of memory. The host shuts down.
    Fatal,
}

impl SurfaceErrorAction {
    /// Classification alone, without touching the surface.
    pub fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }

    #[inline]
    pub fn is_fatal(self) -> bool {
        self == Self::Fatal
    }
}

impl fmt::Display for SurfaceErrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconfigured => f.write_str("surface lost and reconfigured"),
            Self::SkipFrame => f.write_str("surface image unavailable"),
            Self::Fatal => f.write_str("surface out of memory"),
        }
    }
}

/// Picks the swapchain format.
///
/// The atlas is sampled as sRGB, so an sRGB target reproduces its bytes
/// exactly; a linear target still works but shifts colours.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *formats.first()?;
    if !prefer_srgb {
        return Some(first);
    }

    let preferred = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    let srgb = preferred
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()));

    match srgb {
        Some(f) => Some(f),
        None => {
            log::warn!("no sRGB surface format; atlas colours will render shifted ({first:?})");
            Some(first)
        }
    }
}

/// The grid covers the target with opaque texels, so `Opaque` wins unless
/// something else was asked for.
pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .into_iter()
        .chain([wgpu::CompositeAlphaMode::Opaque])
        .find(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Window surface plus the configuration it was last given.
pub(crate) struct SurfaceSlot<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

/// Swapchain options resolved from [`super::GpuInit`].
pub(crate) struct SurfaceOptions {
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub desired_maximum_frame_latency: u32,
}

impl<'w> SurfaceSlot<'w> {
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        options: SurfaceOptions,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = choose_surface_format(&caps.formats, options.prefer_srgb)
            .context("surface reports no supported formats")?;
        let alpha_mode = choose_alpha_mode(&caps.alpha_modes, options.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: options.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: options.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!(
            "surface configured: {format:?} {}x{} ({alpha_mode:?})",
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    #[inline]
    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// wgpu rejects a 0x0 surface; in that case only `size` is updated and
    /// the configure call waits until the window has area again.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(device, &self.config);
    }

    pub(crate) fn acquire(
        &self,
        device: &wgpu::Device,
    ) -> std::result::Result<SurfaceFrame, wgpu::SurfaceError> {
        let texture = self.surface.get_current_texture()?;
        Ok(SurfaceFrame::new(texture, device))
    }

    /// Reconfigures after `Lost`/`Outdated`; reports what the caller should do.
    pub(crate) fn recover(
        &self,
        device: &wgpu::Device,
        err: &wgpu::SurfaceError,
    ) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::classify(err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0
        {
            self.surface.configure(device, &self.config);
        }
        log::debug!("surface error {err:?}: {action}");
        action
    }
}
