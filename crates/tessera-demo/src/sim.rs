use tessera_engine::coords::ClipMatrix;
use tessera_engine::frame::{Scene, SimulationCore};
use tessera_engine::grid::{Pos, Tile, TileGrid};

pub const BOARD_WIDTH: u32 = 48;
pub const BOARD_HEIGHT: u32 = 27;

const WELL_X: u32 = 14;
const WELL_Y: u32 = 4;
const WELL_WIDTH: u32 = 20;
const WELL_HEIGHT: u32 = BOARD_HEIGHT - WELL_Y - 1;

/// Milliseconds between gravity steps.
const STEP_MS: f64 = 120.0;
/// Steps replayed at most per frame after a stall.
const MAX_CATCH_UP: u32 = 8;

const PIECE_LEN: u32 = 2;
const PALETTE: [Tile; 5] = [
    Tile::GREEN_SOLID,
    Tile::CYAN_SOLID,
    Tile::VIOLET_SOLID,
    Tile::GREY_SOLID,
    Tile::BLUE_WHITE,
];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Piece {
    /// Well-relative column.
    col: u32,
    /// Well-relative row of the top cell.
    row: u32,
    tile: Tile,
}

/// Columns of blocks falling into a walled well.
///
/// Row 0 of the board is the top of the screen. Pieces stack on landing,
/// full well rows are cleared and the well empties when a new piece has
/// nowhere to spawn.
pub struct FallingBlocks {
    /// Well cells only, `WELL_WIDTH × WELL_HEIGHT`; `Tile::SPACE` is free.
    well: TileGrid,
    board: TileGrid,
    previous: Vec<u8>,
    previous_clip: Option<ClipMatrix>,

    piece: Piece,
    spawned: u32,
    lines: u32,
    next_step: Option<f64>,
}

impl FallingBlocks {
    pub fn new() -> Self {
        let mut sim = Self {
            well: TileGrid::new(WELL_WIDTH, WELL_HEIGHT, Tile::SPACE),
            board: TileGrid::new(BOARD_WIDTH, BOARD_HEIGHT, Tile::BLUE_SOLID),
            previous: Vec::new(),
            previous_clip: None,
            piece: Piece {
                col: 0,
                row: 0,
                tile: PALETTE[0],
            },
            spawned: 0,
            lines: 0,
            next_step: None,
        };
        sim.spawn();
        sim
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    fn spawn(&mut self) {
        let piece = Piece {
            col: WELL_WIDTH / 2,
            row: 0,
            tile: PALETTE[self.spawned as usize % PALETTE.len()],
        };
        self.spawned += 1;

        if !self.fits(piece.col, piece.row) {
            log::info!("well full after {} lines; clearing", self.lines);
            self.well.fill(Tile::SPACE);
            self.lines = 0;
        }
        self.piece = piece;
    }

    fn fits(&self, col: u32, row: u32) -> bool {
        (row..row + PIECE_LEN).all(|r| self.well.get(Pos(col, r)) == Some(Tile::SPACE))
    }

    /// Moves the piece down one row, or settles it and spawns the next.
    fn step(&mut self) {
        let Piece { col, row, tile } = self.piece;
        if self.fits(col, row + 1) {
            self.piece.row += 1;
            return;
        }

        for r in row..row + PIECE_LEN {
            self.well.set(Pos(col, r), tile);
        }
        self.clear_full_rows();
        self.spawn();
    }

    fn shift(&mut self, dx: i32) {
        let Some(col) = self.piece.col.checked_add_signed(dx) else { return };
        if self.fits(col, self.piece.row) {
            self.piece.col = col;
        }
    }

    fn clear_full_rows(&mut self) {
        let width = WELL_WIDTH as usize;
        let mut kept: Vec<u8> = Vec::with_capacity(self.well.as_bytes().len());
        let mut cleared = 0;
        for row in self.well.as_bytes().chunks_exact(width) {
            if row.iter().all(|&b| b != Tile::SPACE.0) {
                cleared += 1;
            } else {
                kept.extend_from_slice(row);
            }
        }
        if cleared == 0 {
            return;
        }

        self.well.fill(Tile::SPACE);
        let first = cleared as u32;
        for (i, row) in kept.chunks_exact(width).enumerate() {
            for (x, &b) in row.iter().enumerate() {
                self.well.set(Pos(x as u32, first + i as u32), Tile(b));
            }
        }
        self.lines += cleared as u32;
        log::debug!("cleared {cleared} rows ({} total)", self.lines);
    }

    fn advance(&mut self, timestamp: f64) {
        let next = *self.next_step.get_or_insert(timestamp + STEP_MS);
        if timestamp < next {
            return;
        }

        let due = ((timestamp - next) / STEP_MS) as u32 + 1;
        for _ in 0..due.min(MAX_CATCH_UP) {
            self.step();
        }
        self.next_step = Some(if due > MAX_CATCH_UP {
            timestamp + STEP_MS
        } else {
            next + due as f64 * STEP_MS
        });
    }

    fn compose(&mut self) {
        let board = &mut self.board;
        board.fill(Tile::BLUE_SOLID);
        board.draw_rect(WELL_X, 1, WELL_WIDTH, 2, Tile::SPACE);
        board.draw_string(Pos(WELL_X + 1, 1), "TESSERA");
        board.draw_string(Pos(WELL_X + 1, 2), &format!("LINES {}", self.lines));

        for (i, &b) in self.well.as_bytes().iter().enumerate() {
            let x = i as u32 % WELL_WIDTH;
            let y = i as u32 / WELL_WIDTH;
            board.set(Pos(WELL_X + x, WELL_Y + y), Tile(b));
        }

        let Piece { col, row, tile } = self.piece;
        for r in row..row + PIECE_LEN {
            board.set(Pos(WELL_X + col, WELL_Y + r), tile);
        }
    }
}

impl Default for FallingBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationCore for FallingBlocks {
    fn render(&mut self, timestamp: f64, display_width: u32, display_height: u32) -> Scene<'_> {
        self.advance(timestamp);
        self.compose();

        let clip = ClipMatrix::letterbox(display_width, display_height, BOARD_WIDTH, BOARD_HEIGHT);
        let changed = self.board.as_bytes() != self.previous.as_slice()
            || self.previous_clip != Some(clip);
        if changed {
            self.previous.clear();
            self.previous.extend_from_slice(self.board.as_bytes());
            self.previous_clip = Some(clip);
        }

        Scene {
            changed,
            grid_width: self.board.width(),
            grid_height: self.board.height(),
            grid: self.board.as_bytes(),
            clip_matrix: clip,
        }
    }

    fn on_key_down(&mut self, _timestamp: f64, _key_code: u32, key_name: &str) {
        match key_name {
            "ArrowLeft" => self.shift(-1),
            "ArrowRight" => self.shift(1),
            "ArrowDown" => self.step(),
            _ => {}
        }
    }
}
