//! The error and result types for the library.

use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// The [`Result`] type for the crate.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// The error type for the crate. The generation core itself never fails;
/// errors occur only at the loading and game-play boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// A lexicon byte buffer ended before the declared node count.
    TruncatedLexicon,
    /// A leave file declared more values than the buffer holds.
    TruncatedLeaves,
    /// Attempted to play a tile which was not in the player's rack.
    NotInRack,
    /// At least one and no more than 7 tiles may be exchanged.
    ExchangeCount,
    /// The bag does not hold enough tiles for the requested exchange.
    NotEnoughTiles,
    /// A blank tile placed on the board did not specify a letter.
    MissingLetter,
    /// A serialized board cell held a byte outside the letter range.
    BadCell,
    /// Cannot make a play as the game is over.
    Over,
}

impl Error for EngineError {}
impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EngineError::TruncatedLexicon => "Lexicon data ended before the declared node count",
                EngineError::TruncatedLeaves => "Leave data ended before the declared value count",
                EngineError::NotInRack => "One or more played tiles were not in the rack",
                EngineError::ExchangeCount => "At least 1 and up to 7 tiles can be exchanged",
                EngineError::NotEnoughTiles => "There are not enough tiles in the bag to exchange",
                EngineError::MissingLetter =>
                    "A blank tile placed on the board did not specify a letter",
                EngineError::BadCell => "A serialized board cell was out of range",
                EngineError::Over => "The game is over so no further plays can be made",
            }
        )
    }
}
