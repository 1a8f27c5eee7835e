//! Module handling abstract game state: the board, racks, bag and the
//! turn loop used for self-play. The move-generation core never touches
//! this state directly; the game applies the plays the engine returns
//! and keeps the board's derived data fresh between turns.

use crate::{
    equity::Equity,
    error::{EngineError, EngineResult},
    game::{
        bag::{Bag, GameRng},
        board::Board,
        play::{Play, StripCell},
        rack::Rack,
        tile::Tile,
    },
    lexicon::Kwg,
};

pub mod bag;
pub mod board;
pub mod cross_set;
pub mod play;
pub mod rack;
pub mod tile;

/// Consecutive scoreless turns (passes) that end the game.
const PASS_LIMIT: u8 = 6;

/// Models a scrabble player: a rack and a running score in eighths.
#[derive(Debug, Default)]
pub struct Player {
    rack: Rack,
    score: Equity,
}
impl Player {
    /// The player's rack.
    pub fn rack(&self) -> &Rack {
        &self.rack
    }
    /// The player's score in whole points.
    pub fn score(&self) -> i16 {
        self.score.points()
    }
}

/// A two-player game driven from the outside: the caller asks the
/// engine for plays and feeds them back through [`Game::play`].
#[derive(Debug)]
pub struct Game {
    board: Board,
    bag: Bag,
    rng: GameRng,
    players: [Player; 2],
    to_play: usize,
    passes: u8,
    over: bool,
}

impl Game {
    /// Starts a game: shuffles a standard bag with the seeded PRNG and
    /// deals both racks, first player first.
    pub fn new(seed: u32) -> Self {
        let mut rng = GameRng::new(seed);
        let mut bag = Bag::standard();
        bag.shuffle(&mut rng);

        let mut players = [Player::default(), Player::default()];
        for player in &mut players {
            bag.refill(&mut player.rack);
        }

        Self {
            board: Board::new(),
            bag,
            rng,
            players,
            to_play: 0,
            passes: 0,
            over: false,
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }
    /// The number of tiles left in the bag.
    pub fn bag_len(&self) -> usize {
        self.bag.len()
    }
    /// The player whose turn it is.
    pub fn to_play(&self) -> usize {
        self.to_play
    }
    /// A player by number (0 or 1).
    pub fn player(&self, num: usize) -> &Player {
        &self.players[num]
    }
    /// Checks whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Applies a play for the player to move, updates scores and derived
    /// board state, and passes the turn.
    pub fn play(&mut self, play: &Play, kwg: &Kwg) -> EngineResult<()> {
        if self.over {
            return Err(EngineError::Over);
        }

        match play {
            Play::Place(placement) => {
                let player = &mut self.players[self.to_play];

                // check up front so a bad play cannot half-empty the rack.
                let fresh = placement.fresh_tiles().map(|t| t.as_rack_tile());
                if !player.rack.contains(fresh) {
                    return Err(EngineError::NotInRack);
                }

                // fresh tiles leave the rack; a blanked tile was a blank.
                for cell in &placement.strip {
                    if let StripCell::Fresh(tile) = cell {
                        player.rack.remove(tile.as_rack_tile())?;
                    }
                }

                self.board.apply(placement);
                cross_set::update_for_move(&mut self.board, kwg, placement);

                let player = &mut self.players[self.to_play];
                player.score += placement.score;
                self.bag.refill(&mut player.rack);
                self.passes = 0;

                // outplay: going out collects twice the opponent's rack.
                if self.players[self.to_play].rack.is_empty() && self.bag.is_empty() {
                    let opponent_sum = self.players[1 - self.to_play].rack.tile_sum();
                    self.players[self.to_play].score += opponent_sum + opponent_sum;
                    self.over = true;
                }
            }
            Play::Exchange(exchange) => {
                if exchange.tiles.is_empty() || exchange.tiles.len() > 7 {
                    return Err(EngineError::ExchangeCount);
                }
                if self.bag.len() < exchange.tiles.len() {
                    return Err(EngineError::NotEnoughTiles);
                }

                let player = &mut self.players[self.to_play];
                if !player.rack.contains(exchange.tiles.iter().map(Tile::as_rack_tile)) {
                    return Err(EngineError::NotInRack);
                }
                for tile in &exchange.tiles {
                    player.rack.remove(tile.as_rack_tile())?;
                }

                self.bag
                    .return_tiles(exchange.tiles.iter().copied(), &mut self.rng);
                self.bag.refill(&mut self.players[self.to_play].rack);
                self.passes = 0;
            }
            Play::Pass => {
                self.passes += 1;
                if self.passes >= PASS_LIMIT {
                    // a stalled game docks each player their own rack.
                    for player in &mut self.players {
                        let sum = player.rack.tile_sum();
                        player.score -= sum;
                    }
                    self.over = true;
                }
            }
        }

        self.to_play = 1 - self.to_play;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{
            play::{Dir, Exchange, Placement},
            tile::Tile,
        },
        lexicon::KwgBuilder,
    };

    fn kwg() -> Kwg {
        KwgBuilder::from_words(["AA", "AB"]).build()
    }

    fn placement_of(rack_tiles: &[Tile], row: u8, col: u8) -> Placement {
        Placement {
            row,
            col,
            dir: Dir::Across,
            tiles_played: rack_tiles.len() as u8,
            strip: rack_tiles.iter().map(|&t| StripCell::Fresh(t)).collect(),
            score: Equity::from_points(4),
            equity: Equity::from_points(4),
        }
    }

    #[test]
    fn deals_are_deterministic_per_seed() {
        let a = Game::new(5);
        let b = Game::new(5);
        assert_eq!(a.player(0).rack(), b.player(0).rack());
        assert_eq!(a.player(1).rack(), b.player(1).rack());
        assert_eq!(a.bag_len(), 86);
    }

    #[test]
    fn placement_scores_and_refills() {
        let kwg = kwg();
        let mut game = Game::new(1);
        let tiles: Vec<Tile> = game
            .player(0)
            .rack()
            .iter()
            .filter(|t| !t.is_blank())
            .take(2)
            .collect();
        let play = Play::Place(placement_of(&tiles, 7, 7));

        game.play(&play, &kwg).unwrap();
        assert_eq!(game.player(0).score(), 4);
        assert_eq!(game.player(0).rack().len(), 7);
        assert_eq!(game.to_play(), 1);
        assert!(game.board().views_in_sync());
    }

    #[test]
    fn playing_a_tile_not_held_fails() {
        let kwg = kwg();
        let mut game = Game::new(1);

        // a rack can hold at most 2 blanks; 3 blanks cannot be present.
        let tiles = vec![Tile::blank(), Tile::blank(), Tile::blank()];
        let result = game.play(&Play::Place(placement_of(&tiles, 7, 7)), &kwg);
        assert_eq!(result, Err(EngineError::NotInRack));
    }

    #[test]
    fn six_passes_end_the_game() {
        let kwg = kwg();
        let mut game = Game::new(9);
        for _ in 0..6 {
            game.play(&Play::Pass, &kwg).unwrap();
        }
        assert!(game.is_over());
        // both players were docked their racks.
        assert!(game.player(0).score() < 0);
        assert!(game.player(1).score() < 0);
        assert_eq!(game.play(&Play::Pass, &kwg), Err(EngineError::Over));
    }

    #[test]
    fn exchange_keeps_rack_full() {
        let kwg = kwg();
        let mut game = Game::new(3);
        let tiles: Vec<Tile> = game.player(0).rack().iter().take(3).collect();

        let play = Play::Exchange(Exchange {
            tiles,
            equity: Equity::ZERO,
        });
        game.play(&play, &kwg).unwrap();
        assert_eq!(game.player(0).rack().len(), 7);
        assert_eq!(game.bag_len(), 86);
    }
}
