//! Module representing a play (move) chosen by a player.

use crate::{equity::Equity, game::tile::Tile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The direction of a tile placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dir {
    /// Left to right along a row.
    Across,
    /// Top to bottom along a column.
    Down,
}
impl Dir {
    /// Index of the board lane scanned in this direction.
    pub fn lane(self) -> usize {
        match self {
            Dir::Across => 0,
            Dir::Down => 1,
        }
    }
    /// Both directions, across first.
    pub fn iter() -> impl Iterator<Item = Dir> {
        [Dir::Across, Dir::Down].into_iter()
    }
}
impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dir::Across => write!(f, "across"),
            Dir::Down => write!(f, "down"),
        }
    }
}

/// One cell of a placement's tile strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StripCell {
    /// A fresh tile from the rack.
    Fresh(Tile),
    /// A board tile the play passes through.
    Through,
}

/// A placement of fresh tiles along one line of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Row of the first strip cell.
    pub row: u8,
    /// Column of the first strip cell.
    pub col: u8,
    /// Direction of the main word.
    pub dir: Dir,
    /// Number of fresh tiles played.
    pub tiles_played: u8,
    /// The strip: fresh tiles and played-through markers, covering the
    /// whole main word.
    pub strip: Vec<StripCell>,
    /// Score of the play in eighths of a point.
    pub score: Equity,
    /// Equity of the play in eighths of a point.
    pub equity: Equity,
}

impl Placement {
    /// The board coordinates of each strip cell.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (row, col) = (self.row as usize, self.col as usize);
        (0..self.strip.len()).map(move |i| match self.dir {
            Dir::Across => (row, col + i),
            Dir::Down => (row + i, col),
        })
    }
    /// An iterator over the fresh tiles in the strip.
    pub fn fresh_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.strip.iter().filter_map(|cell| match cell {
            StripCell::Fresh(tile) => Some(*tile),
            StripCell::Through => None,
        })
    }
}
impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {} ", self.row, (self.col + b'A') as char, self.dir)?;
        for cell in &self.strip {
            match cell {
                StripCell::Fresh(tile) => write!(f, "{}", tile)?,
                StripCell::Through => write!(f, ".")?,
            }
        }
        write!(f, " {}", self.score.points())
    }
}

/// An exchange of rack tiles for fresh ones from the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The tiles returned to the bag.
    pub tiles: Vec<Tile>,
    /// Equity of the exchange: the value of the kept leave.
    pub equity: Equity,
}

/// A play is the chosen action by a player on their turn: placing
/// tiles, exchanging some, or passing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Play {
    /// The player places tiles on the board.
    Place(Placement),
    /// The player returns tiles to the bag and redraws.
    Exchange(Exchange),
    /// The turn is forfeit.
    Pass,
}

impl Play {
    /// The equity of the play. A pass carries the pass sentinel.
    pub fn equity(&self) -> Equity {
        match self {
            Play::Place(placement) => placement.equity,
            Play::Exchange(exchange) => exchange.equity,
            Play::Pass => Equity::PASS,
        }
    }
    /// The score of the play in eighths. Exchanges and passes score
    /// nothing.
    pub fn score(&self) -> Equity {
        match self {
            Play::Place(placement) => placement.score,
            _ => Equity::ZERO,
        }
    }
}
impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Play::Place(placement) => write!(f, "{}", placement),
            Play::Exchange(exchange) => {
                write!(f, "exchange ")?;
                for tile in &exchange.tiles {
                    write!(f, "{}", tile)?;
                }
                Ok(())
            }
            Play::Pass => write!(f, "pass"),
        }
    }
}
