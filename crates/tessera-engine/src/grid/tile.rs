/// Index of a tile slot in the atlas.
///
/// Slots are numbered row-major over the 16×16 atlas sheet. Only the slots
/// the demo sheet actually paints are named here; any `u8` is a valid tile.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Tile(pub u8);

impl Tile {
    pub const BLOCK: Tile = Tile(62);
    pub const SPACE: Tile = Tile(63);

    pub const GREY_SOLID: Tile = Tile(64);
    pub const GREY_WHITE: Tile = Tile(65);
    pub const GREEN_SOLID: Tile = Tile(80);
    pub const GREEN_WHITE: Tile = Tile(81);
    pub const CYAN_SOLID: Tile = Tile(96);
    pub const CYAN_WHITE: Tile = Tile(97);
    pub const BLUE_SOLID: Tile = Tile(112);
    pub const BLUE_WHITE: Tile = Tile(113);
    pub const VIOLET_SOLID: Tile = Tile(128);
    pub const VIOLET_WHITE: Tile = Tile(129);

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Blank cell; slot 0 is the glyph `A`, not an empty tile.
impl Default for Tile {
    fn default() -> Self {
        Tile::SPACE
    }
}

impl From<u8> for Tile {
    fn from(value: u8) -> Self {
        Tile(value)
    }
}

const PUNCTUATION: &str = "!\"#$%.0123456789-*<>_/'()[]{}?:;|,+=";

/// Maps a character to its glyph tile in the atlas font rows.
///
/// Letters are case-insensitive (`A`..`Z` → 0..25); digits and punctuation
/// follow from slot 26; space is [`Tile::SPACE`]; anything else renders as
/// [`Tile::BLOCK`].
pub fn glyph_for_char(c: char) -> Tile {
    if c.is_ascii_alphabetic() {
        return Tile(c.to_ascii_uppercase() as u8 - b'A');
    }
    if c == ' ' {
        return Tile::SPACE;
    }
    match PUNCTUATION.find(c) {
        Some(i) => Tile(26 + i as u8),
        None => Tile::BLOCK,
    }
}
