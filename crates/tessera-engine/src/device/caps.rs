use anyhow::Result;

/// Texel format used for the src-to-origin and origin-to-dest tables.
///
/// wgpu has no three-channel float format; the fourth channel is always zero.
pub const FLOAT_TABLE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Fails when the adapter cannot sample 32-bit float textures.
///
/// The lookup tables hold normalized offsets that do not survive 8-bit
/// quantization, so there is no degraded mode without them.
pub fn require_float_tables(adapter: &wgpu::Adapter) -> Result<()> {
    let features = adapter.get_texture_format_features(FLOAT_TABLE_FORMAT);

    anyhow::ensure!(
        features
            .allowed_usages
            .contains(wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST),
        "adapter '{}' cannot sample {:?} textures (float texture support is required)",
        adapter.get_info().name,
        FLOAT_TABLE_FORMAT,
    );

    Ok(())
}

/// Device limits for grids up to `max_grid_side` cells on each axis.
pub fn limits_for_grid(adapter: &wgpu::Adapter, max_grid_side: u32) -> Result<wgpu::Limits> {
    grid_limits(adapter.limits().max_texture_dimension_2d, max_grid_side)
}

fn grid_limits(supported_side: u32, max_grid_side: u32) -> Result<wgpu::Limits> {
    anyhow::ensure!(
        max_grid_side <= supported_side,
        "grids up to {max_grid_side} cells wide need {max_grid_side}px textures; adapter allows {supported_side}",
    );

    let mut limits = wgpu::Limits::downlevel_defaults();
    limits.max_texture_dimension_2d = limits.max_texture_dimension_2d.max(max_grid_side);
    Ok(limits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_side_raises_texture_limit() {
        let limits = grid_limits(16384, 8192).unwrap();
        assert_eq!(limits.max_texture_dimension_2d, 8192);
    }

    #[test]
    fn small_grid_keeps_downlevel_floor() {
        let limits = grid_limits(16384, 64).unwrap();
        assert_eq!(
            limits.max_texture_dimension_2d,
            wgpu::Limits::downlevel_defaults().max_texture_dimension_2d
        );
    }

    #[test]
    fn grid_beyond_adapter_is_rejected() {
        let err = grid_limits(4096, 8192).unwrap_err();
        assert!(err.to_string().contains("adapter allows 4096"));
    }
}
