use std::fmt;
use std::path::{Path, PathBuf};

use super::texture;
use super::{RenderCtx, RenderError};

/// Number of tile columns/rows in the atlas sheet.
pub const TILES_WIDTH: u32 = 16;
pub const TILES_HEIGHT: u32 = 16;

/// Colour shown for every tile until (or instead of) the real atlas.
pub const PLACEHOLDER_RGBA: [u8; 4] = [228, 92, 16, 255];

/// Regular grid layout of the atlas sheet.
///
/// Tile index `k` lives in slot `(k % columns, k / columns)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AtlasLayout {
    pub columns: u32,
    pub rows: u32,
}

impl AtlasLayout {
    #[inline]
    pub const fn tile_count(self) -> u32 {
        self.columns * self.rows
    }

    /// Slot `(column, row)` of a tile index.
    #[inline]
    pub const fn slot(self, index: u32) -> (u32, u32) {
        (index % self.columns, index / self.columns)
    }
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            columns: TILES_WIDTH,
            rows: TILES_HEIGHT,
        }
    }
}

/// Where the atlas comes from and what stands in for it meanwhile.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    pub path: PathBuf,
    pub layout: AtlasLayout,
    pub placeholder: [u8; 4],
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/Tiles.png"),
            layout: AtlasLayout::default(),
            placeholder: PLACEHOLDER_RGBA,
        }
    }
}

// ── decoded image ─────────────────────────────────────────────────────────

/// Decoded RGBA8 atlas pixels, ready to upload.
#[derive(Clone, PartialEq, Eq)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl fmt::Debug for AtlasImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlasImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl AtlasImage {
    /// A 1×1 image of a single colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    /// Wraps raw RGBA8 pixels; `None` when the length does not match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decodes PNG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, AtlasLoadError> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|e| AtlasLoadError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Reads and decodes an image file.
    pub fn load(path: &Path) -> Result<Self, AtlasLoadError> {
        let bytes = std::fs::read(path).map_err(|e| AtlasLoadError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::decode(&bytes)
    }
}

/// Why the atlas image could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasLoadError {
    Io { path: PathBuf, message: String },
    Decode(String),
    /// The loader went away without reporting.
    Abandoned,
}

impl fmt::Display for AtlasLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasLoadError::Io { path, message } => {
                write!(f, "cannot read atlas '{}': {message}", path.display())
            }
            AtlasLoadError::Decode(msg) => write!(f, "cannot decode atlas: {msg}"),
            AtlasLoadError::Abandoned => write!(f, "atlas loader stopped without a result"),
        }
    }
}

impl std::error::Error for AtlasLoadError {}

// ── GPU texture ───────────────────────────────────────────────────────────

/// The sprite-sheet texture sampled by the fragment stage.
pub struct TileAtlas {
    layout: AtlasLayout,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    placeholder: bool,
    generation: u64,
}

impl TileAtlas {
    /// Creates the atlas bound to a 1×1 `placeholder` colour.
    pub fn placeholder(
        ctx: &RenderCtx<'_>,
        layout: AtlasLayout,
        rgba: [u8; 4],
    ) -> Result<Self, RenderError> {
        let (texture, view) = Self::upload(ctx, &AtlasImage::solid(rgba))?;
        Ok(Self {
            layout,
            texture,
            view,
            placeholder: true,
            generation: 0,
        })
    }

    /// Replaces the placeholder (or a previous sheet) with `image`.
    pub fn replace(&mut self, ctx: &RenderCtx<'_>, image: &AtlasImage) -> Result<(), RenderError> {
        let (texture, view) = Self::upload(ctx, image)?;

        if image.width % self.layout.columns != 0 || image.height % self.layout.rows != 0 {
            log::warn!(
                "atlas {}x{} is not a multiple of its {}x{} tile grid; tiles will bleed",
                image.width,
                image.height,
                self.layout.columns,
                self.layout.rows
            );
        }

        self.texture = texture;
        self.view = view;
        self.placeholder = false;
        self.generation += 1;
        log::info!("atlas installed ({}x{})", image.width, image.height);
        Ok(())
    }

    fn upload(
        ctx: &RenderCtx<'_>,
        image: &AtlasImage,
    ) -> Result<(wgpu::Texture, wgpu::TextureView), RenderError> {
        let texture = texture::create_texture(
            ctx,
            "tessera tile atlas",
            image.width,
            image.height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        )?;
        texture::write_full(ctx.queue, &texture, &image.pixels, image.width, image.height, 4);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok((texture, view))
    }

    #[inline]
    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    /// True until a real sheet has been installed.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    pub(super) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub(super) fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_16_by_16() {
        let l = AtlasLayout::default();
        assert_eq!(l.tile_count(), 256);
        assert_eq!(l.slot(0), (0, 0));
        assert_eq!(l.slot(17), (1, 1));
        assert_eq!(l.slot(255), (15, 15));
    }

    #[test]
    fn from_rgba_checks_length() {
        assert!(AtlasImage::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(AtlasImage::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = AtlasImage::decode(b"not a png").unwrap_err();
        assert!(matches!(err, AtlasLoadError::Decode(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AtlasImage::load(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, AtlasLoadError::Io { .. }));
        assert!(err.to_string().contains("here.png"));
    }

    #[test]
    fn decode_png_round_trip() {
        let mut png = Vec::new();
        let img = image::RgbaImage::from_raw(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255]).unwrap();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = AtlasImage::decode(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert_eq!(decoded.pixels, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
