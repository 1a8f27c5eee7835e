//! Models the scrabble board.
//!
//! The board is stored twice: a row-major lane scanned for across plays
//! and a column-major lane scanned for down plays. Both lanes carry, for
//! every square, the placed tile, the perpendicular cross-set and
//! cross-score, and the line-direction extension sets used for pruning.
//! The two lanes agree on tile placement at all times.

use crate::{
    equity::Equity,
    error::{EngineError, EngineResult},
    game::{
        play::{Dir, Placement, StripCell},
        tile::{LetterSet, Tile},
    },
};
use std::fmt;

/// The number of rows on the board.
pub const ROWS: usize = 15;
/// The number of columns on the board.
pub const COLS: usize = 15;
/// The number of squares on the board.
pub const CELLS: usize = ROWS * COLS;
/// The centre square, target of the opening move.
pub const STAR: (usize, usize) = (7, 7);

/// Additional bonus for certain positions on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Premium {
    /// The square doubles the value of the tile placed on it.
    DoubleLetter,
    /// The square triples the value of the tile placed on it.
    TripleLetter,
    /// The square doubles the total value of a word placed on it.
    DoubleWord,
    /// The square triples the total value of a word placed on it.
    TripleWord,
    /// The centre square: counts as a double word. The first word
    /// must intersect this square.
    Start,
}
impl Premium {
    /// Gets the multiplier for a word placed on a square with
    /// this bonus.
    pub fn word_multiplier(&self) -> i16 {
        match self {
            Premium::DoubleWord | Premium::Start => 2,
            Premium::TripleWord => 3,
            _ => 1,
        }
    }
    /// Gets the multiplier for a tile placed on a square with
    /// this bonus.
    pub fn tile_multiplier(&self) -> i16 {
        match self {
            Premium::DoubleLetter => 2,
            Premium::TripleLetter => 3,
            _ => 1,
        }
    }
}

/// Gets the optional bonus of a square from the standard symmetric
/// layout.
pub fn premium_at(row: usize, col: usize) -> Option<Premium> {
    // the layout is symmetric about the centre, so classify by the
    // absolute distance to the star square.
    let delta_row = row.abs_diff(7);
    let delta_col = col.abs_diff(7);

    match (delta_row, delta_col) {
        (0, 0) => Some(Premium::Start),
        (2, 2) | (2, 6) | (6, 2) => Some(Premium::TripleLetter),
        (0, 4) | (4, 0) | (1, 1) | (1, 5) | (5, 1) | (7, 4) | (4, 7) => {
            Some(Premium::DoubleLetter)
        }
        (7, 7) | (0, 7) | (7, 0) => Some(Premium::TripleWord),
        (a, b) if a == b => Some(Premium::DoubleWord),
        _ => None,
    }
}

/// Gets the `(tile multiplier, word multiplier)` pair for a square,
/// defaulting to `(1, 1)`.
pub fn premium_multipliers(row: usize, col: usize) -> (i16, i16) {
    match premium_at(row, col) {
        Some(bonus) => (bonus.tile_multiplier(), bonus.word_multiplier()),
        None => (1, 1),
    }
}

/// Offsets along the opening line that penalize a vowel on the very
/// first move: the squares a reply could pair with a premium square.
const OPENING_HOTSPOTS: [usize; 6] = [2, 4, 6, 8, 10, 12];

/// Checks whether placing a vowel at this offset along the opening line
/// attracts the opening penalty. Indexed by (direction, offset) though
/// the standard layout is symmetric in the direction.
pub fn is_opening_hotspot(_dir: Dir, offset: usize) -> bool {
    OPENING_HOTSPOTS.contains(&offset)
}

/// One directional view of the board. Indexed row-major for the across
/// lane and column-major for the down lane, so a "row" is always a
/// contiguous 15-square line in the scan direction.
#[derive(Clone)]
pub struct Lane {
    tiles: [Option<Tile>; CELLS],
    cross_sets: [LetterSet; CELLS],
    cross_scores: [Option<Equity>; CELLS],
    leftx: [LetterSet; CELLS],
    rightx: [LetterSet; CELLS],
}

impl Default for Lane {
    fn default() -> Self {
        Self {
            tiles: [None; CELLS],
            cross_sets: [LetterSet::ALL; CELLS],
            cross_scores: [None; CELLS],
            leftx: [LetterSet::ALL; CELLS],
            rightx: [LetterSet::ALL; CELLS],
        }
    }
}
impl Lane {
    /// The tile at a lane index.
    pub fn tile(&self, index: usize) -> Option<Tile> {
        self.tiles[index]
    }
    /// The cross-set at a lane index: letters forming a legal word
    /// perpendicular to the scan direction.
    pub fn cross_set(&self, index: usize) -> LetterSet {
        self.cross_sets[index]
    }
    /// The cross-score at a lane index, or `None` when the square has no
    /// perpendicular neighbours.
    pub fn cross_score(&self, index: usize) -> Option<Equity> {
        self.cross_scores[index]
    }
    /// Front hooks of the tile run immediately after the square in the
    /// scan direction.
    pub fn leftx(&self, index: usize) -> LetterSet {
        self.leftx[index]
    }
    /// Back hooks of the tile run immediately before the square in the
    /// scan direction.
    pub fn rightx(&self, index: usize) -> LetterSet {
        self.rightx[index]
    }
    /// The tiles of one scan line.
    pub fn line_tiles(&self, line: usize) -> &[Option<Tile>] {
        &self.tiles[line * COLS..(line + 1) * COLS]
    }

    pub(crate) fn set_cross_data(
        &mut self,
        index: usize,
        cross_set: LetterSet,
        cross_score: Option<Equity>,
    ) {
        self.cross_sets[index] = cross_set;
        self.cross_scores[index] = cross_score;
    }
    pub(crate) fn set_extension_sets(&mut self, index: usize, leftx: LetterSet, rightx: LetterSet) {
        self.leftx[index] = leftx;
        self.rightx[index] = rightx;
    }
    pub(crate) fn clear_square(&mut self, index: usize) {
        self.cross_sets[index] = LetterSet::EMPTY;
        self.cross_scores[index] = None;
        self.leftx[index] = LetterSet::EMPTY;
        self.rightx[index] = LetterSet::EMPTY;
    }
}

/// The 15 x 15 scrabble board with both lane views kept in sync.
#[derive(Clone, Default)]
pub struct Board {
    lanes: [Lane; 2],
    tiles_placed: usize,
}

impl Board {
    /// Creates an empty board: every square empty, cross-sets and
    /// extension sets unconstrained, no cross-scores.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lane scanned in direction `dir`.
    pub fn lane(&self, dir: Dir) -> &Lane {
        &self.lanes[dir.lane()]
    }
    pub(crate) fn lane_mut(&mut self, dir: Dir) -> &mut Lane {
        &mut self.lanes[dir.lane()]
    }
    /// The number of tiles placed on the board.
    pub fn tiles_placed(&self) -> usize {
        self.tiles_placed
    }
    /// Checks whether the board is empty (the next play opens the game).
    pub fn is_bare(&self) -> bool {
        self.tiles_placed == 0
    }
    /// The tile at a board position.
    pub fn tile_at(&self, row: usize, col: usize) -> Option<Tile> {
        self.lanes[0].tiles[row * COLS + col]
    }
    /// Checks whether a board position holds no tile.
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        self.tile_at(row, col).is_none()
    }

    /// Places a tile into both lane views. Used only between turns when
    /// a move is applied.
    pub(crate) fn place(&mut self, row: usize, col: usize, tile: Tile) {
        if self.lanes[0].tiles[row * COLS + col].is_none() {
            self.tiles_placed += 1;
        }
        self.lanes[0].tiles[row * COLS + col] = Some(tile);
        self.lanes[1].tiles[col * ROWS + row] = Some(tile);
    }

    /// Applies a placement to the board, skipping played-through cells.
    /// Cross data must then be refreshed via the cross-set updater.
    pub fn apply(&mut self, placement: &Placement) {
        for ((row, col), cell) in placement.positions().zip(&placement.strip) {
            if let StripCell::Fresh(tile) = cell {
                self.place(row, col, *tile);
            }
        }
    }

    /// Checks that the two lane views agree on tile placement.
    pub fn views_in_sync(&self) -> bool {
        (0..ROWS).all(|r| {
            (0..COLS).all(|c| self.lanes[0].tiles[r * COLS + c] == self.lanes[1].tiles[c * ROWS + r])
        })
    }

    /// The board as a 15 x 15 cell array, the exchange format shared
    /// with UI and storage.
    pub fn to_cells(&self) -> Vec<Vec<Option<Tile>>> {
        (0..ROWS)
            .map(|r| (0..COLS).map(|c| self.tile_at(r, c)).collect())
            .collect()
    }
    /// Rebuilds a board from a cell array. Blanks must carry their
    /// assigned letter. Cross data is not computed here; run the
    /// cross-set updater's rebuild afterwards.
    pub fn from_cells(cells: &[Vec<Option<Tile>>]) -> EngineResult<Self> {
        let mut board = Board::new();
        for (r, row) in cells.iter().enumerate().take(ROWS) {
            for (c, cell) in row.iter().enumerate().take(COLS) {
                if let Some(tile) = cell {
                    if matches!(tile, Tile::Blank(None)) {
                        return Err(EngineError::MissingLetter);
                    }
                    board.place(r, c, *tile);
                }
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            for col in 0..COLS {
                match self.tile_at(row, col) {
                    Some(tile) => write!(f, " {}", tile)?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board ({} tiles)", self.tiles_placed)?;
        write!(f, "{}", self)
    }
}
