//! Models the scrabble rack as a multiset of tiles.

use crate::{
    error::{EngineError, EngineResult},
    game::tile::{LetterSet, Tile, ALPHABET_SIZE},
};
use std::fmt;

/// The maximum number of tiles that can be stored on a player's rack.
pub const RACK_SIZE: usize = 7;

/// A multiset over the 27 tile kinds, stored as per-tile counts plus a
/// redundant running total.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rack {
    counts: [u8; ALPHABET_SIZE],
    total: u8,
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for tile in self.iter() {
            write!(f, "{}", tile)?;
        }
        write!(f, "]")
    }
}
impl Rack {
    /// Creates an empty rack.
    pub fn new() -> Self {
        Self::default()
    }
    /// Creates a rack holding the provided tiles. Blanks with assigned
    /// letters are stored as plain blanks.
    pub fn with_tiles(tiles: &[Tile]) -> Self {
        let mut rack = Self::new();
        for tile in tiles.iter().take(RACK_SIZE) {
            rack.add(tile.as_rack_tile());
        }
        rack
    }
    /// The number of tiles in the rack.
    pub fn len(&self) -> usize {
        self.total as usize
    }
    /// Checks whether the rack is empty.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
    /// The count of a specific tile kind.
    pub fn count(&self, tile: Tile) -> usize {
        self.counts[tile.slot()] as usize
    }
    /// Checks whether the rack holds at least one of `tile`.
    pub fn has(&self, tile: Tile) -> bool {
        self.counts[tile.slot()] > 0
    }
    /// Checks whether the rack holds a blank.
    pub fn has_blank(&self) -> bool {
        self.counts[26] > 0
    }
    /// The set of explicit letters present on the rack (blanks excluded).
    pub fn letter_set(&self) -> LetterSet {
        crate::game::tile::Letter::iter()
            .filter(|&l| self.counts[usize::from(l)] > 0)
            .collect()
    }
    /// Adds a tile to the rack.
    pub fn add(&mut self, tile: Tile) {
        self.counts[tile.slot()] += 1;
        self.total += 1;
    }
    /// Removes one tile of the given kind. Returns an error if the rack
    /// does not hold one.
    pub fn remove(&mut self, tile: Tile) -> EngineResult<()> {
        let slot = tile.slot();
        if self.counts[slot] == 0 {
            return Err(EngineError::NotInRack);
        }
        self.counts[slot] -= 1;
        self.total -= 1;
        Ok(())
    }
    /// The summed score of the tiles on the rack, in eighths. Used for
    /// endgame adjustments.
    pub fn tile_sum(&self) -> crate::equity::Equity {
        self.iter().map(|t| t.score()).sum()
    }
    /// Checks whether all `tiles` are contained within the rack.
    pub fn contains(&self, tiles: impl Iterator<Item = Tile>) -> bool {
        let mut counts = [0u8; ALPHABET_SIZE];
        for tile in tiles {
            counts[tile.slot()] += 1;
        }
        counts.iter().zip(self.counts).all(|(&need, have)| need <= have)
    }
    /// An iterator over the tiles on the rack, letters first then blanks.
    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(slot, &count)| {
                std::iter::repeat(Tile::from_slot(slot)).take(count as usize)
            })
    }
    /// Raw per-slot counts, indexed by [`Tile::slot`].
    pub fn counts(&self) -> &[u8; ALPHABET_SIZE] {
        &self.counts
    }
    /// Asserts the redundant total against the counts. Holds whenever the
    /// rack is only mutated through [`Rack::add`] and [`Rack::remove`].
    pub fn total_matches_counts(&self) -> bool {
        self.counts.iter().map(|&c| c as usize).sum::<usize>() == self.total as usize
    }
}
impl FromIterator<Tile> for Rack {
    fn from_iter<T: IntoIterator<Item = Tile>>(tiles: T) -> Self {
        let mut rack = Rack::new();
        for tile in tiles {
            rack.add(tile.as_rack_tile());
        }
        rack
    }
}
