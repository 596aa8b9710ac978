use std::fmt;

use crate::device::SurfaceErrorAction;

/// Errors raised by the tile pipeline.
///
/// `Shader` and `Allocation` are initialization-class: the pipeline cannot run
/// without them. The rest are per-frame and the frame driver drops the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// WGSL failed to parse/validate, or the two stages do not link.
    Shader { stage: &'static str, message: String },

    /// A texture or buffer would exceed device limits (or is empty).
    Allocation {
        what: &'static str,
        width: u32,
        height: u32,
        limit: u32,
    },

    /// Grid bytes do not match the declared dimensions.
    SceneShape { width: u32, height: u32, len: usize },

    /// Copying a texture back to the host failed.
    Readback(String),

    /// The swapchain could not provide a frame.
    Surface(SurfaceErrorAction),
}

impl RenderError {
    /// True for errors after which the process should stop.
    pub fn is_fatal(&self) -> bool {
        match self {
            RenderError::Shader { .. } | RenderError::Allocation { .. } => true,
            RenderError::Surface(action) => action.is_fatal(),
            RenderError::SceneShape { .. } | RenderError::Readback(_) => false,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Shader { stage, message } => {
                write!(f, "{stage} shader error: {message}")
            }
            RenderError::Allocation {
                what,
                width,
                height,
                limit,
            } => write!(
                f,
                "cannot allocate {what} of {width}x{height} (max dimension {limit})"
            ),
            RenderError::SceneShape { width, height, len } => write!(
                f,
                "grid of {width}x{height} needs {} bytes, got {len}",
                *width as usize * *height as usize
            ),
            RenderError::Readback(msg) => write!(f, "texture readback failed: {msg}"),
            RenderError::Surface(action) => write!(f, "{action}"),
        }
    }
}

impl std::error::Error for RenderError {}
