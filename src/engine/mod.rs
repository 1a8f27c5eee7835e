//! The move-generation engine.
//!
//! One call to [`Generator::generate`] runs the shadow pass over every
//! anchor, processes anchors best-first with early cutoff, compares the
//! best placement against the best exchange, and returns the winner.
//! Generation is deterministic: identical inputs produce bit-identical
//! plays.

use crate::{
    engine::{
        anchor::{Anchor, AnchorHeap},
        exchange::best_exchange,
        leave_map::LeaveMap,
        movegen::{LineCache, MoveGen},
        shadow::{shadow_bound, ShadowCtx},
    },
    equity::Equity,
    game::{
        board::{Board, COLS, ROWS, STAR},
        play::{Dir, Play},
        rack::Rack,
    },
    lexicon::{Klv, Kwg},
};

mod anchor;
mod exchange;
mod leave_map;
mod movegen;
mod shadow;

/// Tunable parameters of the engine, all in eighths of a point.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Penalty per vowel on an opening hotspot square.
    pub opening_hotspot_penalty: Equity,
    /// Constant subtracted when a play leaves tiles on the rack with an
    /// empty bag.
    pub non_outplay_penalty: Equity,
    /// Bonus for playing the entire rack.
    pub bingo_bonus: Equity,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            opening_hotspot_penalty: Equity::from_eighths(-6),
            non_outplay_penalty: Equity::from_points(10),
            bingo_bonus: Equity::from_points(50),
        }
    }
}

/// How the anchor set is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Shadow pass plus best-first processing with early cutoff.
    Shadow,
    /// Process every anchor in scan order.
    NoShadow,
    /// Full scan on blank-free racks, shadow otherwise. Must select the
    /// same play as the other strategies.
    Hybrid,
}

/// Counters describing one generation call.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenStats {
    /// Anchors the generator actually expanded.
    pub anchors_considered: usize,
    /// Anchors discarded by the bound cutoff.
    pub anchors_cut_off: usize,
    /// Completed words scored.
    pub plays_examined: usize,
}

/// The play selected for a position, with the call's statistics.
#[derive(Debug)]
pub struct Generated {
    /// The best play by equity, or a pass when nothing is available.
    pub play: Play,
    /// Observation counters for the call.
    pub stats: GenStats,
}

/// A move generator bound to its immutable lexicon data.
#[derive(Debug, Clone)]
pub struct Generator<'a> {
    kwg: &'a Kwg,
    klv: Option<&'a Klv>,
    config: GenConfig,
}

impl<'a> Generator<'a> {
    /// Creates a generator without a leave evaluator: equity degenerates
    /// to the raw score and exchanges are never offered.
    pub fn new(kwg: &'a Kwg) -> Self {
        Self {
            kwg,
            klv: None,
            config: GenConfig::default(),
        }
    }
    /// Creates a generator with a leave evaluator.
    pub fn with_leaves(kwg: &'a Kwg, klv: &'a Klv) -> Self {
        Self {
            kwg,
            klv: Some(klv),
            config: GenConfig::default(),
        }
    }
    /// Overrides the default configuration.
    pub fn with_config(mut self, config: GenConfig) -> Self {
        self.config = config;
        self
    }

    /// Finds the best play for a position. The caller's rack is not
    /// modified; the board is never mutated by generation.
    pub fn generate(
        &self,
        board: &Board,
        rack: &Rack,
        opp_rack: Option<&Rack>,
        bag_count: usize,
        strategy: Strategy,
    ) -> Generated {
        let opp_rack_sum = opp_rack.map(Rack::tile_sum).unwrap_or(Equity::ZERO);
        let mut stats = GenStats::default();

        let use_shadow = match strategy {
            Strategy::Shadow => true,
            Strategy::NoShadow => false,
            Strategy::Hybrid => rack.has_blank(),
        };

        let anchors = collect_anchors(board);
        let mut leave_map = LeaveMap::new(self.klv, rack);

        // shadow pass: bound every anchor, heap-order by bound.
        let mut heap = AnchorHeap::new();
        if use_shadow && !rack.is_empty() {
            let ctx = ShadowCtx::new(&leave_map, &self.config, rack, bag_count, opp_rack_sum);
            let mut cached_line: Option<LineCache> = None;

            for mut anchor in anchors.iter().copied() {
                let refill = match &cached_line {
                    Some(line) => line.dir != anchor.dir || line.line != anchor.line as usize,
                    None => true,
                };
                if refill {
                    cached_line = Some(LineCache::fill(board, anchor.dir, anchor.line as usize));
                }
                let line = cached_line.as_ref().expect("line cached above");

                anchor.bound = shadow_bound(
                    &ctx,
                    line,
                    anchor.col as usize,
                    anchor.last_anchor_col,
                    rack,
                );
                if anchor.bound > Equity::INITIAL {
                    heap.push(anchor);
                }
            }
        }

        let mut gen = MoveGen::new(
            self.kwg,
            &self.config,
            board,
            rack.clone(),
            leave_map,
            bag_count,
            opp_rack_sum,
        );

        if use_shadow {
            while let Some(anchor) = heap.pop() {
                // nothing left in the heap can beat the best play found.
                if gen.best.equity > anchor.bound {
                    stats.anchors_cut_off += 1 + heap.len();
                    break;
                }
                stats.anchors_considered += 1;
                gen.generate(board, &anchor);
            }
        } else {
            for anchor in &anchors {
                stats.anchors_considered += 1;
                gen.generate(board, anchor);
            }
        }

        leave_map = gen.leave_map;
        let exchange = best_exchange(&mut leave_map, rack, bag_count, self.klv.is_some());

        stats.plays_examined = gen.plays_examined;
        log::debug!(
            "movegen: {} anchors considered, {} cut off, {} plays examined",
            stats.anchors_considered,
            stats.anchors_cut_off,
            stats.plays_examined,
        );

        let placement = gen.best.into_placement();
        let play = match (placement, exchange) {
            (Some(placement), Some(exchange)) if exchange.equity > placement.equity => {
                Play::Exchange(exchange)
            }
            (Some(placement), _) => Play::Place(placement),
            (None, Some(exchange)) => Play::Exchange(exchange),
            (None, None) => Play::Pass,
        };

        Generated { play, stats }
    }
}

/// Finds every anchor on the board in canonical scan order: across
/// lines first, then down lines; within a line, left to right. On an
/// empty board the only anchor is the centre star, across.
fn collect_anchors(board: &Board) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    let dirs: &[Dir] = match board.is_bare() {
        true => &[Dir::Across],
        false => &[Dir::Across, Dir::Down],
    };

    for &dir in dirs {
        for line in 0..ROWS {
            let mut last_anchor_col = None;
            for col in 0..COLS {
                if is_anchor(board, dir, line, col) {
                    anchors.push(Anchor {
                        dir,
                        line: line as u8,
                        col: col as u8,
                        last_anchor_col,
                        bound: Equity::MAX,
                        scan_order: Anchor::scan_order_of(dir, line, col),
                    });
                    last_anchor_col = Some(col as u8);
                }
            }
        }
    }

    anchors
}

/// An anchor is an empty square orthogonally adjacent to a tile, or the
/// centre star on the opening move.
fn is_anchor(board: &Board, dir: Dir, line: usize, col: usize) -> bool {
    let (row, board_col) = match dir {
        Dir::Across => (line, col),
        Dir::Down => (col, line),
    };

    if !board.is_empty_at(row, board_col) {
        return false;
    }
    if board.is_bare() {
        return (row, board_col) == STAR;
    }

    (row > 0 && !board.is_empty_at(row - 1, board_col))
        || (row < ROWS - 1 && !board.is_empty_at(row + 1, board_col))
        || (board_col > 0 && !board.is_empty_at(row, board_col - 1))
        || (board_col < COLS - 1 && !board.is_empty_at(row, board_col + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{
            cross_set,
            tile::{Letter, Tile},
        },
        lexicon::{KlvBuilder, KwgBuilder},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const WORDS: [&str; 12] = [
        "ACT", "ACTS", "AS", "AT", "CASA", "CAST", "CAT", "CATS", "SAT", "TA", "TAS", "TSK",
    ];

    fn kwg() -> Kwg {
        KwgBuilder::from_words(WORDS).build()
    }

    fn klv() -> Klv {
        let mut builder = KlvBuilder::new();
        // hand-picked leave values over the test alphabet.
        builder.insert("?", Equity::from_points(25));
        builder.insert("S", Equity::from_points(8));
        builder.insert("A", Equity::from_points(1));
        builder.insert("C", Equity::from_points(-1));
        builder.insert("T", Equity::from_points(-2));
        builder.insert("AS", Equity::from_points(7));
        builder.insert("AT", Equity::from_points(2));
        builder.insert("ST", Equity::from_points(3));
        builder.insert("?S", Equity::from_points(30));
        builder.insert("?A", Equity::from_points(24));
        builder.build()
    }

    fn rack(letters: &str) -> Rack {
        letters
            .chars()
            .map(|ch| match ch {
                '?' => Tile::blank(),
                _ => Tile::Letter(Letter::new(ch).unwrap()),
            })
            .collect()
    }

    fn letter(ch: char) -> Letter {
        Letter::new(ch).unwrap()
    }

    /// A board with a few crossing words placed and cross data rebuilt.
    fn mid_game_board(kwg: &Kwg) -> Board {
        let mut board = Board::new();
        for (i, ch) in "CAT".chars().enumerate() {
            board.place(7, 6 + i, Tile::Letter(letter(ch)));
        }
        for (i, ch) in "AS".chars().enumerate() {
            board.place(8 + i, 7, Tile::Letter(letter(ch)));
        }
        cross_set::rebuild_all(&mut board, kwg);
        board
    }

    /// A board holding only CAT through the star.
    fn cat_board(kwg: &Kwg) -> Board {
        let mut board = Board::new();
        for (i, ch) in "CAT".chars().enumerate() {
            board.place(7, 6 + i, Tile::Letter(letter(ch)));
        }
        cross_set::rebuild_all(&mut board, kwg);
        board
    }

    /// Places `count` random tiles from the test alphabet in a blob
    /// around the centre and rebuilds the cross data.
    fn random_board(kwg: &Kwg, rng: &mut StdRng, count: usize) -> Board {
        let mut board = Board::new();
        let (mut row, mut col) = STAR;
        board.place(row, col, random_tile(rng));

        while board.tiles_placed() < count {
            // random walk keeps the blob connected.
            match rng.gen_range(0..4) {
                0 if row > 2 => row -= 1,
                1 if row < 12 => row += 1,
                2 if col > 2 => col -= 1,
                _ if col < 12 => col += 1,
                _ => {}
            }
            if board.is_empty_at(row, col) {
                board.place(row, col, random_tile(rng));
            }
        }

        cross_set::rebuild_all(&mut board, kwg);
        board
    }

    fn random_tile(rng: &mut StdRng) -> Tile {
        let letters = ['A', 'C', 'T', 'S'];
        Tile::Letter(letter(letters[rng.gen_range(0..letters.len())]))
    }

    fn random_rack(rng: &mut StdRng) -> Rack {
        let choices = ['A', 'C', 'T', 'S', '?'];
        let len = rng.gen_range(1..=7);
        (0..len)
            .map(|_| match choices[rng.gen_range(0..choices.len())] {
                '?' => Tile::blank(),
                ch => Tile::Letter(letter(ch)),
            })
            .collect()
    }

    #[test]
    fn opening_play_covers_the_star() {
        let kwg = kwg();
        let generator = Generator::new(&kwg);
        let board = Board::new();

        let result = generator.generate(&board, &rack("CATS"), None, 86, Strategy::NoShadow);
        match result.play {
            Play::Place(placement) => {
                assert_eq!(placement.dir, Dir::Across);
                assert!(placement
                    .positions()
                    .any(|(r, c)| (r, c) == STAR));
                // CATS doubled through the star, C on a hotspot-free
                // square; no vowel penalty applies to C, S or T.
                assert!(placement.score >= Equity::from_points(12));
            }
            other => panic!("expected a placement, got {:?}", other),
        }
    }

    #[test]
    fn no_legal_play_passes() {
        let kwg = kwg();
        let generator = Generator::new(&kwg);
        let board = Board::new();

        // no word in the lexicon uses only Q.
        let result = generator.generate(&board, &rack("Q"), None, 86, Strategy::Shadow);
        assert!(matches!(result.play, Play::Pass));
    }

    #[test]
    fn strategies_agree_on_scripted_position() {
        let kwg = kwg();
        let klv = klv();
        let generator = Generator::with_leaves(&kwg, &klv);
        let board = mid_game_board(&kwg);

        for rack_letters in ["CATS", "SSA?", "TT", "?", "ACTSA", "SATCAT"] {
            let rack = rack(rack_letters);
            let shadow = generator.generate(&board, &rack, None, 50, Strategy::Shadow);
            let no_shadow = generator.generate(&board, &rack, None, 50, Strategy::NoShadow);
            let hybrid = generator.generate(&board, &rack, None, 50, Strategy::Hybrid);

            assert_eq!(shadow.play, no_shadow.play, "rack {rack_letters}");
            assert_eq!(shadow.play, hybrid.play, "rack {rack_letters}");
        }
    }

    #[test]
    fn strategies_agree_on_random_positions() {
        let kwg = kwg();
        let klv = klv();
        let generator = Generator::with_leaves(&kwg, &klv);
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for round in 0..60 {
            let board_tile_count = rng.gen_range(2..20);
            let board = random_board(&kwg, &mut rng, board_tile_count);
            let player_rack = random_rack(&mut rng);
            let bag_count = rng.gen_range(0..90);

            let opp = rack("QZ");
            let shadow = generator.generate(&board, &player_rack, Some(&opp), bag_count, Strategy::Shadow);
            let no_shadow =
                generator.generate(&board, &player_rack, Some(&opp), bag_count, Strategy::NoShadow);

            assert_eq!(
                shadow.play, no_shadow.play,
                "round {round}, rack {player_rack}, bag {bag_count}\n{board}"
            );
        }
    }

    #[test]
    fn shadow_bounds_dominate_every_anchor_best() {
        let kwg = kwg();
        let klv = klv();
        let config = GenConfig::default();
        let mut rng = StdRng::seed_from_u64(0xab1e);

        for _ in 0..30 {
            let board_tile_count = rng.gen_range(2..16);
            let board = random_board(&kwg, &mut rng, board_tile_count);
            let rack = random_rack(&mut rng);
            let bag_count = rng.gen_range(1..50);

            let leave_map = LeaveMap::new(Some(&klv), &rack);
            let ctx = ShadowCtx::new(&leave_map, &config, &rack, bag_count, Equity::ZERO);

            for anchor in collect_anchors(&board) {
                let line = LineCache::fill(&board, anchor.dir, anchor.line as usize);
                let bound = shadow_bound(
                    &ctx,
                    &line,
                    anchor.col as usize,
                    anchor.last_anchor_col,
                    &rack,
                );

                // generate only this anchor's plays and compare.
                let mut gen = MoveGen::new(
                    &kwg,
                    &config,
                    &board,
                    rack.clone(),
                    LeaveMap::new(Some(&klv), &rack),
                    bag_count,
                    Equity::ZERO,
                );
                gen.generate(&board, &anchor);

                if gen.best.found() {
                    assert!(
                        bound >= gen.best.equity,
                        "bound {:?} < best {:?} at anchor {:?}\n{board}",
                        bound,
                        gen.best.equity,
                        anchor,
                    );
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic_and_preserves_the_rack() {
        let kwg = kwg();
        let klv = klv();
        let generator = Generator::with_leaves(&kwg, &klv);
        let board = mid_game_board(&kwg);
        let rack = rack("ACTS?");
        let before = rack.clone();

        let first = generator.generate(&board, &rack, None, 40, Strategy::Shadow);
        let second = generator.generate(&board, &rack, None, 40, Strategy::Shadow);

        assert_eq!(first.play, second.play);
        assert_eq!(rack, before);
    }

    #[test]
    fn blanks_are_not_spent_when_the_letter_is_held() {
        let kwg = kwg();
        // every leave that keeps the blank dwarfs everything else, so
        // the best play must spend explicit tiles only.
        let mut builder = KlvBuilder::new();
        builder.insert("?", Equity::from_points(90));
        builder.insert("?A", Equity::from_points(90));
        builder.insert("?T", Equity::from_points(90));
        builder.insert("A", Equity::from_points(1));
        builder.insert("T", Equity::from_points(1));
        builder.insert("AT", Equity::from_points(2));
        let klv = builder.build();

        let generator = Generator::with_leaves(&kwg, &klv);
        let board = cat_board(&kwg);

        let result = generator.generate(&board, &rack("TA?"), None, 50, Strategy::NoShadow);
        match result.play {
            Play::Place(placement) => {
                assert!(placement.fresh_tiles().all(|tile| !tile.is_blank()));
            }
            other => panic!("expected a placement, got {:?}", other),
        }
    }

    #[test]
    fn empty_bag_prefers_going_out() {
        let kwg = kwg();
        let klv = klv();
        let generator = Generator::with_leaves(&kwg, &klv);
        let board = cat_board(&kwg);

        // Q + Z: 20 points on the opponent's rack.
        let opp = rack("QZ");
        let result = generator.generate(&board, &rack("SA"), Some(&opp), 0, Strategy::Shadow);
        match result.play {
            Play::Place(placement) => {
                // going out with both tiles collects 2x the opponent
                // rack; equity reflects that, not a leave.
                assert_eq!(placement.tiles_played, 2);
                assert_eq!(
                    placement.equity,
                    placement.score + Equity::from_points(2 * 20)
                );
            }
            other => panic!("expected a placement, got {:?}", other),
        }
    }

    #[test]
    fn exchange_taken_when_leaves_beat_plays() {
        let kwg = kwg();
        let mut builder = KlvBuilder::new();
        // an enormous value for keeping exactly "AS".
        builder.insert("AS", Equity::from_points(90));
        builder.insert("A", Equity::from_points(1));
        builder.insert("S", Equity::from_points(2));
        builder.insert("T", Equity::from_points(-30));
        builder.insert("AT", Equity::from_points(-10));
        builder.insert("TS", Equity::from_points(-12));
        builder.insert("ATS", Equity::from_points(-14));
        let klv = builder.build();

        let generator = Generator::with_leaves(&kwg, &klv);
        let board = mid_game_board(&kwg);

        let result = generator.generate(&board, &rack("AST"), None, 80, Strategy::Shadow);
        match result.play {
            Play::Exchange(exchange) => {
                assert_eq!(exchange.tiles, vec![Tile::Letter(letter('T'))]);
                assert_eq!(exchange.equity, Equity::from_points(90));
            }
            other => panic!("expected an exchange, got {:?}", other),
        }
    }

    /// Replays recorded self-play games against real tournament
    /// lexicons. Point SCRABBLE_LEXICON_DIR at a directory holding
    /// NWL23.kwg/.klv16 and CSW24.kwg/.klv16, then run with --ignored.
    #[test]
    #[ignore = "needs tournament lexicon files"]
    fn self_play_scenarios_match_recorded_scores() {
        use crate::game::Game;

        const SCENARIOS: [(u32, &str, i16, i16); 6] = [
            (0, "NWL23", 430, 515),
            (1, "NWL23", 447, 464),
            (2, "NWL23", 620, 344),
            (8, "NWL23", 555, 310),
            (0, "CSW24", 437, 462),
            (9, "CSW24", 529, 450),
        ];

        let dir = std::env::var("SCRABBLE_LEXICON_DIR").expect("SCRABBLE_LEXICON_DIR set");
        for (seed, lexicon, expected_p0, expected_p1) in SCENARIOS {
            let kwg_bytes = std::fs::read(format!("{dir}/{lexicon}.kwg")).unwrap();
            let klv_bytes = std::fs::read(format!("{dir}/{lexicon}.klv16")).unwrap();
            let (kwg, _) = Kwg::from_bytes(&kwg_bytes).unwrap();
            let klv = Klv::from_bytes(&klv_bytes).unwrap();
            let generator = Generator::with_leaves(&kwg, &klv);

            let mut scores = Vec::new();
            for strategy in [Strategy::Shadow, Strategy::NoShadow] {
                let mut game = Game::new(seed);
                let mut turns = 0;
                while !game.is_over() && turns < 200 {
                    let mover = game.to_play();
                    let rack = game.player(mover).rack().clone();
                    let opp_rack = game.player(1 - mover).rack().clone();
                    let generated = generator.generate(
                        game.board(),
                        &rack,
                        Some(&opp_rack),
                        game.bag_len(),
                        strategy,
                    );
                    game.play(&generated.play, &kwg).unwrap();
                    turns += 1;
                }
                scores.push((game.player(0).score(), game.player(1).score()));
            }

            assert_eq!(scores[0], scores[1], "seed {seed} {lexicon} shadow vs full scan");
            assert_eq!(
                scores[0],
                (expected_p0, expected_p1),
                "seed {seed} {lexicon}"
            );
        }
    }

    #[test]
    fn stats_report_cutoffs_under_shadow() {
        let kwg = kwg();
        let klv = klv();
        let generator = Generator::with_leaves(&kwg, &klv);
        let board = mid_game_board(&kwg);

        let shadow = generator.generate(&board, &rack("CATS"), None, 50, Strategy::Shadow);
        let full = generator.generate(&board, &rack("CATS"), None, 50, Strategy::NoShadow);

        assert!(shadow.stats.anchors_considered <= full.stats.anchors_considered);
        assert!(shadow.stats.plays_examined <= full.stats.plays_examined);
    }
}
