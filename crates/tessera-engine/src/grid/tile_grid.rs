use std::ops::{Index, IndexMut};

use super::tile::{glyph_for_char, Tile};

/// Cell position `(column, row)`; row 0 is the first row of the byte buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pos(pub u32, pub u32);

/// Row-major grid of tile indices, one byte per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<u8>,
}

impl TileGrid {
    /// Creates a `width × height` grid filled with `fill`.
    ///
    /// Zero dimensions are bumped to 1; the renderer never sees an empty grid.
    pub fn new(width: u32, height: u32, fill: Tile) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![fill.0; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The packed row-major buffer handed to the renderer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.tiles
    }

    pub fn get(&self, pos: Pos) -> Option<Tile> {
        self.offset(pos).map(|i| Tile(self.tiles[i]))
    }

    /// Writes a tile; positions outside the grid are ignored.
    pub fn set(&mut self, pos: Pos, tile: Tile) {
        if let Some(i) = self.offset(pos) {
            self.tiles[i] = tile.0;
        }
    }

    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile.0);
    }

    /// Fills the `w × h` rectangle whose first cell is `(x, y)`, clipped to the grid.
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, tile: Tile) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for row in y.min(y_end)..y_end {
            for col in x.min(x_end)..x_end {
                self.tiles[(row * self.width + col) as usize] = tile.0;
            }
        }
    }

    /// Writes `text` as glyph tiles starting at `pos`, left to right.
    ///
    /// Text running past the right edge is cut off rather than wrapped.
    pub fn draw_string(&mut self, pos: Pos, text: &str) {
        if pos.1 >= self.height {
            return;
        }
        for (i, c) in text.chars().enumerate() {
            let col = pos.0 as usize + i;
            if col >= self.width as usize {
                break;
            }
            self.set(Pos(col as u32, pos.1), glyph_for_char(c));
        }
    }

    fn offset(&self, pos: Pos) -> Option<usize> {
        (pos.0 < self.width && pos.1 < self.height)
            .then(|| (pos.1 * self.width + pos.0) as usize)
    }
}

impl Index<Pos> for TileGrid {
    type Output = u8;

    fn index(&self, pos: Pos) -> &u8 {
        &self.tiles[(pos.1 * self.width + pos.0) as usize]
    }
}

impl IndexMut<Pos> for TileGrid {
    fn index_mut(&mut self, pos: Pos) -> &mut u8 {
        &mut self.tiles[(pos.1 * self.width + pos.0) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_filled() {
        let g = TileGrid::new(3, 2, Tile::BLUE_SOLID);
        assert_eq!(g.as_bytes(), &[112; 6]);
        assert_eq!((g.width(), g.height()), (3, 2));
    }

    #[test]
    fn zero_dimensions_are_bumped() {
        let g = TileGrid::new(0, 0, Tile::SPACE);
        assert_eq!((g.width(), g.height()), (1, 1));
    }

    #[test]
    fn indexing_is_row_major() {
        let mut g = TileGrid::new(4, 3, Tile::SPACE);
        g[Pos(1, 2)] = 9;
        assert_eq!(g.as_bytes()[2 * 4 + 1], 9);
        assert_eq!(g.get(Pos(1, 2)), Some(Tile(9)));
        assert_eq!(g.get(Pos(4, 0)), None);
    }

    #[test]
    fn draw_rect_clips_to_grid() {
        let mut g = TileGrid::new(4, 4, Tile::SPACE);
        g.draw_rect(2, 2, 10, 10, Tile(7));
        let filled = g.as_bytes().iter().filter(|&&b| b == 7).count();
        assert_eq!(filled, 4);
        assert_eq!(g[Pos(3, 3)], 7);
        assert_eq!(g[Pos(1, 1)], Tile::SPACE.0);
    }

    #[test]
    fn draw_string_writes_glyphs_and_truncates() {
        let mut g = TileGrid::new(4, 1, Tile::SPACE);
        g.draw_string(Pos(1, 0), "ab c");
        assert_eq!(g.as_bytes(), &[Tile::SPACE.0, 0, 1, Tile::SPACE.0]);
    }

    #[test]
    fn draw_string_below_grid_is_ignored() {
        let mut g = TileGrid::new(2, 2, Tile::SPACE);
        g.draw_string(Pos(0, 5), "hi");
        assert_eq!(g.as_bytes(), &[Tile::SPACE.0; 4]);
    }
}
