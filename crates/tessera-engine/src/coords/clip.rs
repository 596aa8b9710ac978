use bytemuck::{Pod, Zeroable};

/// 4×4 matrix mapping grid-local positions to clip space.
///
/// Stored column-major, the layout WGSL expects for `mat4x4<f32>`; element
/// `12`/`13` hold the X/Y translation.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ClipMatrix(pub [f32; 16]);

impl ClipMatrix {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// 2-D orthographic projection of the rectangle `[left, right] × [bottom, top]`
    /// onto `[-1, 1] × [-1, 1]`. Z passes through unchanged.
    #[rustfmt::skip]
    pub fn orthographic_2d(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self([
            2.0 / (right - left), 0.0,                  0.0, 0.0,
            0.0,                  2.0 / (top - bottom), 0.0, 0.0,
            0.0,                  0.0,                  1.0, 0.0,
            -(right + left) / (right - left),
            -(top + bottom) / (top - bottom),
            0.0,
            1.0,
        ])
    }

    /// Projection that shows the whole `grid_width × grid_height` grid inside a
    /// `display_width × display_height` surface without distorting tiles.
    ///
    /// The grid is centred; the surplus display axis is padded equally on both
    /// sides. A zero-sized display falls back to stretching the grid.
    pub fn letterbox(
        display_width: u32,
        display_height: u32,
        grid_width: u32,
        grid_height: u32,
    ) -> Self {
        let gw = grid_width.max(1) as f32;
        let gh = grid_height.max(1) as f32;

        if display_width == 0 || display_height == 0 {
            return Self::orthographic_2d(0.0, gw, 0.0, gh);
        }

        let display_ratio = display_width as f32 / display_height as f32;
        let grid_ratio = gw / gh;

        if display_ratio > grid_ratio {
            let ratio = display_ratio / grid_ratio;
            let offset = (1.0 - ratio) / 2.0;
            Self::orthographic_2d(gw * offset, gw * (ratio + offset), 0.0, gh)
        } else if display_ratio < grid_ratio {
            let ratio = grid_ratio / display_ratio;
            let offset = (1.0 - ratio) / 2.0;
            Self::orthographic_2d(0.0, gw, gh * offset, gh * (ratio + offset))
        } else {
            Self::orthographic_2d(0.0, gw, 0.0, gh)
        }
    }

    /// Multiplies a column vector.
    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let mut out = [0.0f32; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|col| m[col * 4 + row] * v[col]).sum();
        }
        out
    }
}

impl Default for ClipMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 16]> for ClipMatrix {
    fn from(value: [f32; 16]) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    // ── orthographic_2d ───────────────────────────────────────────────────

    #[test]
    fn identity_leaves_points_alone() {
        let p = [3.0, -2.0, 0.5, 1.0];
        assert_eq!(ClipMatrix::identity().transform(p), p);
    }

    #[test]
    fn ortho_maps_corners_to_ndc() {
        let m = ClipMatrix::orthographic_2d(0.0, 48.0, 0.0, 27.0);
        assert!(approx(m.transform([0.0, 0.0, 0.0, 1.0]), [-1.0, -1.0, 0.0, 1.0]));
        assert!(approx(m.transform([48.0, 27.0, 0.0, 1.0]), [1.0, 1.0, 0.0, 1.0]));
        assert!(approx(m.transform([24.0, 13.5, 0.0, 1.0]), [0.0, 0.0, 0.0, 1.0]));
    }

    // ── letterbox ─────────────────────────────────────────────────────────

    #[test]
    fn letterbox_matching_ratio_fills_display() {
        let m = ClipMatrix::letterbox(480, 270, 48, 27);
        assert!(approx(m.transform([0.0, 0.0, 0.0, 1.0]), [-1.0, -1.0, 0.0, 1.0]));
        assert!(approx(m.transform([48.0, 27.0, 0.0, 1.0]), [1.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn letterbox_wide_display_pads_horizontally() {
        // 2:1 display, square grid: the grid occupies the middle half.
        let m = ClipMatrix::letterbox(200, 100, 10, 10);
        assert!(approx(m.transform([0.0, 0.0, 0.0, 1.0]), [-0.5, -1.0, 0.0, 1.0]));
        assert!(approx(m.transform([10.0, 10.0, 0.0, 1.0]), [0.5, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn letterbox_tall_display_pads_vertically() {
        let m = ClipMatrix::letterbox(100, 200, 10, 10);
        assert!(approx(m.transform([0.0, 0.0, 0.0, 1.0]), [-1.0, -0.5, 0.0, 1.0]));
        assert!(approx(m.transform([10.0, 10.0, 0.0, 1.0]), [1.0, 0.5, 0.0, 1.0]));
    }

    #[test]
    fn letterbox_zero_display_stretches() {
        let m = ClipMatrix::letterbox(0, 0, 4, 2);
        assert_eq!(m, ClipMatrix::orthographic_2d(0.0, 4.0, 0.0, 2.0));
    }
}
