//! Shared texture helpers used by every lookup table and the tile map.

use super::{RenderCtx, RenderError};

// ── sampling ──────────────────────────────────────────────────────────────

/// The one sampler all four pipeline textures are read through.
///
/// Nearest filtering keeps pixel-art tiles crisp and makes every lookup table
/// read return an exact texel; clamp keeps edge cells from wrapping.
pub(super) fn nearest_clamp_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("tessera nearest sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

// ── allocation ────────────────────────────────────────────────────────────

/// Rejects sizes the device cannot hold before anything is created.
pub(super) fn check_extent(
    ctx: &RenderCtx<'_>,
    what: &'static str,
    width: u32,
    height: u32,
) -> Result<(), RenderError> {
    let limit = ctx.max_texture_side();
    if width == 0 || height == 0 || width > limit || height > limit {
        return Err(RenderError::Allocation {
            what,
            width,
            height,
            limit,
        });
    }
    Ok(())
}

/// Creates a single-mip 2-D texture that can be written, sampled and read back.
pub(super) fn create_texture(
    ctx: &RenderCtx<'_>,
    label: &'static str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<wgpu::Texture, RenderError> {
    check_extent(ctx, label, width, height)?;

    Ok(ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    }))
}

/// Writes tightly packed texel rows into the whole of `texture`.
///
/// `queue.write_texture` has no row alignment requirement, so rows are never
/// padded here regardless of `width`.
/// Layout of tightly packed source rows; `write_texture` needs no padding.
pub(super) fn upload_layout(
    width: u32,
    height: u32,
    bytes_per_texel: u32,
) -> wgpu::TexelCopyBufferLayout {
    wgpu::TexelCopyBufferLayout {
        offset: 0,
        bytes_per_row: Some(width * bytes_per_texel),
        rows_per_image: Some(height),
    }
}

pub(super) fn write_full(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes: &[u8],
    width: u32,
    height: u32,
    bytes_per_texel: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        upload_layout(width, height, bytes_per_texel),
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

// ── readback ──────────────────────────────────────────────────────────────

/// Row pitch for texture→buffer copies, which must be 256-byte aligned.
pub fn padded_bytes_per_row(width: u32, bytes_per_texel: u32) -> u32 {
    let unpadded = width * bytes_per_texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding of a readback buffer.
pub fn strip_row_padding(padded: &[u8], tight_row: usize, padded_row: usize) -> Vec<u8> {
    if tight_row == 0 || padded_row == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(padded.len() / padded_row * tight_row);
    for row in padded.chunks(padded_row) {
        out.extend_from_slice(&row[..tight_row.min(row.len())]);
    }
    out
}

/// Reinterprets tightly packed `Rgba32Float` bytes as texels.
pub(super) fn float_texels(bytes: &[u8]) -> Vec<[f32; 4]> {
    bytes
        .chunks_exact(16)
        .map(|t| {
            let mut texel = [0.0f32; 4];
            for (c, raw) in texel.iter_mut().zip(t.chunks_exact(4)) {
                *c = f32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            texel
        })
        .collect()
}

/// Copies a whole texture back to the host and returns tightly packed rows.
///
/// Blocks until the GPU has finished; meant for tests and diagnostics, never
/// for the per-frame path.
pub(super) fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    bytes_per_texel: u32,
) -> Result<Vec<u8>, RenderError> {
    let width = texture.width();
    let height = texture.height();
    let padded_row = padded_bytes_per_row(width, bytes_per_texel);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("tessera readback buffer"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("tessera readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = crossbeam_channel::bounded(1);
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .map_err(|e| RenderError::Readback(e.to_string()))?;

    rx.recv()
        .map_err(|_| RenderError::Readback("map callback never ran".into()))?
        .map_err(|e| RenderError::Readback(e.to_string()))?;

    let tight = {
        let mapped = slice.get_mapped_range();
        strip_row_padding(
            &mapped,
            (width * bytes_per_texel) as usize,
            padded_row as usize,
        )
    };
    buffer.unmap();

    Ok(tight)
}
