//! Recursive GADDAG move generation for a single anchor.
//!
//! From each anchor the generator travels leftward through the graph's
//! reversed prefixes, crosses the separator, and extends rightward,
//! scoring incrementally and recording every completed word. Only the
//! single best play by equity survives, under a total comparator so the
//! result never depends on generation order.

use crate::{
    engine::{anchor::Anchor, leave_map::LeaveMap, GenConfig},
    equity::Equity,
    game::{
        board::{self, Board, COLS},
        play::{Dir, Placement, StripCell},
        rack::Rack,
        tile::{LetterSet, Tile},
    },
    lexicon::{Kwg, NodeIndex},
};

/// One line of a board lane, copied out for fast scanning. A "col" here
/// is always the position along the scan direction.
#[derive(Debug)]
pub(crate) struct LineCache {
    pub dir: Dir,
    pub line: usize,
    pub tiles: [Option<Tile>; COLS],
    pub cross_scores: [Option<Equity>; COLS],
    /// Cross-set intersected with the square's front hooks. A fresh tile
    /// always sits immediately before any run to its right, so the
    /// front-hook constraint holds wherever the tile lands.
    pub allowed: [LetterSet; COLS],
    /// Back hooks of the run before each square. Only sound at the
    /// anchor square itself, where the previous-anchor rule pins the
    /// word start to the run's start.
    pub rightx: [LetterSet; COLS],
    pub mults: [(i16, i16); COLS],
}

impl LineCache {
    /// Copies one lane line out of the board.
    pub fn fill(board: &Board, dir: Dir, line: usize) -> Self {
        let lane = board.lane(dir);
        let mut cache = Self {
            dir,
            line,
            tiles: [None; COLS],
            cross_scores: [None; COLS],
            allowed: [LetterSet::EMPTY; COLS],
            rightx: [LetterSet::EMPTY; COLS],
            mults: [(1, 1); COLS],
        };

        for col in 0..COLS {
            let index = line * COLS + col;
            cache.tiles[col] = lane.tile(index);
            cache.cross_scores[col] = lane.cross_score(index);
            cache.allowed[col] = lane.cross_set(index) & lane.leftx(index);
            cache.rightx[col] = lane.rightx(index);

            let (row, board_col) = match dir {
                Dir::Across => (line, col),
                Dir::Down => (col, line),
            };
            cache.mults[col] = board::premium_multipliers(row, board_col);
        }

        cache
    }

    /// Checks whether a line position holds no tile.
    pub fn is_empty(&self, col: usize) -> bool {
        self.tiles[col].is_none()
    }
    /// The legal placement set at a position, including the anchor-only
    /// back-hook constraint.
    pub fn placement_set(&self, col: usize, anchor_col: usize) -> LetterSet {
        match col == anchor_col {
            true => self.allowed[col] & self.rightx[col],
            false => self.allowed[col],
        }
    }
}

/// The best play found so far, compared under the total ordering.
#[derive(Debug)]
pub(crate) struct BestMove {
    pub equity: Equity,
    pub score: Equity,
    pub row: usize,
    pub col: usize,
    pub dir: Dir,
    pub tiles_played: u8,
    pub strip: Vec<StripCell>,
}

impl BestMove {
    pub fn new() -> Self {
        Self {
            equity: Equity::INITIAL,
            score: Equity::ZERO,
            row: 0,
            col: 0,
            dir: Dir::Across,
            tiles_played: 0,
            strip: Vec::new(),
        }
    }
    /// Checks whether any play has been recorded.
    pub fn found(&self) -> bool {
        self.equity > Equity::INITIAL
    }
    /// Converts the slot into a placement.
    pub fn into_placement(self) -> Option<Placement> {
        match self.found() {
            true => Some(Placement {
                row: self.row as u8,
                col: self.col as u8,
                dir: self.dir,
                tiles_played: self.tiles_played,
                strip: self.strip,
                score: self.score,
                equity: self.equity,
            }),
            false => None,
        }
    }
}

/// Per-call context shared by every anchor's generation.
pub(crate) struct MoveGen<'a> {
    kwg: &'a Kwg,
    config: &'a GenConfig,
    pub rack: Rack,
    pub leave_map: LeaveMap,
    rack_size_at_start: usize,
    bag_count: usize,
    opening: bool,
    opp_rack_sum: Equity,
    pub best: BestMove,
    pub plays_examined: usize,

    // per-anchor state, saved and restored around every recursion step
    line: LineCache,
    anchor_col: usize,
    last_anchor_col: Option<u8>,
    strip: [StripCell; COLS],
    tiles_played: u8,
    main_score: i32,
    cross_score: i32,
    word_mult: i32,
}

impl<'a> MoveGen<'a> {
    pub fn new(
        kwg: &'a Kwg,
        config: &'a GenConfig,
        board: &Board,
        rack: Rack,
        leave_map: LeaveMap,
        bag_count: usize,
        opp_rack_sum: Equity,
    ) -> Self {
        let rack_size_at_start = rack.len();
        Self {
            kwg,
            config,
            rack,
            leave_map,
            rack_size_at_start,
            bag_count,
            opening: board.is_bare(),
            opp_rack_sum,
            best: BestMove::new(),
            plays_examined: 0,
            line: LineCache::fill(board, Dir::Across, 0),
            anchor_col: 0,
            last_anchor_col: None,
            strip: [StripCell::Through; COLS],
            tiles_played: 0,
            main_score: 0,
            cross_score: 0,
            word_mult: 1,
        }
    }

    /// Generates every play through one anchor, keeping the best.
    pub fn generate(&mut self, board: &Board, anchor: &Anchor) {
        self.line = LineCache::fill(board, anchor.dir, anchor.line as usize);
        self.anchor_col = anchor.col as usize;
        self.last_anchor_col = anchor.last_anchor_col;
        self.tiles_played = 0;
        self.main_score = 0;
        self.cross_score = 0;
        self.word_mult = 1;

        let root = self.kwg.gaddag_root();
        self.extend(self.anchor_col, root, self.anchor_col, self.anchor_col);

        debug_assert_eq!(self.rack.len(), self.rack_size_at_start);
        debug_assert!(self.rack.total_matches_counts());
    }

    /// Tries every continuation at `col` from the given graph node:
    /// follow the placed tile if the square is occupied, otherwise try
    /// each rack tile in the square's placement set.
    fn extend(&mut self, col: usize, node_index: NodeIndex, leftstrip: usize, rightstrip: usize) {
        let kwg = self.kwg;

        match self.line.tiles[col] {
            Some(tile) => {
                // an occupied square admits exactly its own letter.
                let letter = tile.letter().expect("a placed tile has a letter");
                let mut i = node_index;
                while i != 0 {
                    let node = kwg.node(i);
                    if node.tile() == letter.index() {
                        self.go_on(col, tile, node.arc(), node.accepts(), leftstrip, rightstrip);
                        break;
                    }
                    if node.is_end() {
                        break;
                    }
                    i += 1;
                }
            }
            None if !self.rack.is_empty() => {
                let allowed = self.line.placement_set(col, self.anchor_col);
                if allowed.is_empty() {
                    return;
                }

                for (letter, accepts, arc) in kwg.siblings(node_index) {
                    if !allowed.contains(letter) {
                        continue;
                    }

                    let tile = Tile::Letter(letter);
                    if self.rack.has(tile) {
                        self.rack.remove(tile).expect("rack has tile");
                        self.leave_map.take(tile.slot(), self.rack.count(tile));
                        self.tiles_played += 1;

                        self.go_on(col, tile, arc, accepts, leftstrip, rightstrip);

                        self.tiles_played -= 1;
                        self.leave_map.restore(tile.slot(), self.rack.count(tile));
                        self.rack.add(tile);
                    }
                    if self.rack.has_blank() {
                        let blank = Tile::blank();
                        self.rack.remove(blank).expect("rack has blank");
                        self.leave_map.take(blank.slot(), self.rack.count(blank));
                        self.tiles_played += 1;

                        self.go_on(col, Tile::Blank(Some(letter)), arc, accepts, leftstrip, rightstrip);

                        self.tiles_played -= 1;
                        self.leave_map.restore(blank.slot(), self.rack.count(blank));
                        self.rack.add(blank);
                    }
                }
            }
            None => {}
        }
    }

    /// Scores the letter at `col` and continues the traversal: leftward
    /// while at or before the anchor, crossing the separator to extend
    /// rightward once the left end is settled.
    fn go_on(
        &mut self,
        col: usize,
        tile: Tile,
        next_node: NodeIndex,
        accepts: bool,
        leftstrip: usize,
        rightstrip: usize,
    ) {
        let fresh = self.line.is_empty(col);

        let saved_main = self.main_score;
        let saved_cross = self.cross_score;
        let saved_mult = self.word_mult;
        let saved_cell = self.strip[col];

        if fresh {
            self.strip[col] = StripCell::Fresh(tile);
            let (tile_mult, word_mult) = self.line.mults[col];
            let tile_score = i32::from(tile.score().eighths()) * i32::from(tile_mult);

            self.word_mult *= i32::from(word_mult);
            self.main_score += tile_score;
            if let Some(cross) = self.line.cross_scores[col] {
                self.cross_score += (tile_score + i32::from(cross.eighths())) * i32::from(word_mult);
            }
        } else {
            self.strip[col] = StripCell::Through;
            self.main_score += i32::from(tile.score().eighths());
        }

        if col <= self.anchor_col {
            let leftstrip = col;
            let no_letter_left = col == 0 || self.line.is_empty(col - 1);
            let no_letter_right_of_anchor =
                self.anchor_col == COLS - 1 || self.line.is_empty(self.anchor_col + 1);

            if accepts && no_letter_left && no_letter_right_of_anchor && self.tiles_played > 0 {
                self.record(leftstrip, rightstrip);
            }

            // keep travelling left, but never onto the previous
            // anchor's column.
            if next_node != 0 && col > 0 && Some((col - 1) as u8) != self.last_anchor_col {
                self.extend(col - 1, next_node, leftstrip, rightstrip);
            }

            // the left end is settled: cross the separator and extend
            // rightward from just past the anchor.
            if next_node != 0 && no_letter_left && self.anchor_col < COLS - 1 {
                let sep = self.kwg.follow_separator(next_node);
                if sep != 0 {
                    self.extend(self.anchor_col + 1, sep, leftstrip, rightstrip);
                }
            }
        } else {
            let rightstrip = col;
            let no_letter_right = col == COLS - 1 || self.line.is_empty(col + 1);

            if accepts && no_letter_right && self.tiles_played > 0 {
                self.record(leftstrip, rightstrip);
            }

            if next_node != 0 && col < COLS - 1 {
                self.extend(col + 1, next_node, leftstrip, rightstrip);
            }
        }

        self.main_score = saved_main;
        self.cross_score = saved_cross;
        self.word_mult = saved_mult;
        self.strip[col] = saved_cell;
    }

    /// Scores the completed word and replaces the best play when the
    /// candidate is strictly better under the total ordering.
    fn record(&mut self, leftstrip: usize, rightstrip: usize) {
        self.plays_examined += 1;

        let mut score = self.main_score * self.word_mult + self.cross_score;
        if self.tiles_played as usize == self.rack_size_at_start {
            score += i32::from(self.config.bingo_bonus.eighths());
        }

        let mut equity = score;
        if self.bag_count > 0 {
            equity += i32::from(self.leave_map.current_leave().eighths());
        } else {
            // the bag is empty: endgame adjustments replace the leave.
            match self.rack.is_empty() {
                true => equity += 2 * i32::from(self.opp_rack_sum.eighths()),
                false => {
                    equity -= 2 * i32::from(self.rack.tile_sum().eighths());
                    equity -= i32::from(self.config.non_outplay_penalty.eighths());
                }
            }
        }
        if self.opening {
            equity += self.opening_penalty(leftstrip, rightstrip);
        }

        let equity = Equity::from_accumulated(equity);
        let score = Equity::from_accumulated(score);

        // cheap reject: strictly worse equity loses every comparison.
        if equity < self.best.equity {
            return;
        }

        let (row, col) = match self.line.dir {
            Dir::Across => (self.line.line, leftstrip),
            Dir::Down => (leftstrip, self.line.line),
        };
        let dir = self.line.dir;
        let strip = &self.strip[leftstrip..=rightstrip];

        if self.candidate_beats_best(equity, score, row, col, dir, strip) {
            self.best.equity = equity;
            self.best.score = score;
            self.best.row = row;
            self.best.col = col;
            self.best.dir = dir;
            self.best.tiles_played = self.tiles_played;
            self.best.strip = strip.to_vec();
        }
    }

    /// Penalty for vowels on the opening move's hotspot squares.
    fn opening_penalty(&self, leftstrip: usize, rightstrip: usize) -> i32 {
        let mut penalty = 0;
        for col in leftstrip..=rightstrip {
            if let StripCell::Fresh(tile) = self.strip[col] {
                let vowel = tile.letter().map(|l| l.is_vowel()).unwrap_or(false);
                if vowel && board::is_opening_hotspot(self.line.dir, col) {
                    penalty += i32::from(self.config.opening_hotspot_penalty.eighths());
                }
            }
        }
        penalty
    }

    /// The total ordering on plays: equity, score, start row, start
    /// column, direction (across first), fewer fresh tiles, shorter
    /// strip, lexicographically smaller strip.
    fn candidate_beats_best(
        &self,
        equity: Equity,
        score: Equity,
        row: usize,
        col: usize,
        dir: Dir,
        strip: &[StripCell],
    ) -> bool {
        let best = &self.best;
        if equity != best.equity {
            return equity > best.equity;
        }
        if score != best.score {
            return score > best.score;
        }
        if row != best.row {
            return row < best.row;
        }
        if col != best.col {
            return col < best.col;
        }
        if dir != best.dir {
            return dir == Dir::Across;
        }
        if self.tiles_played != best.tiles_played {
            return self.tiles_played < best.tiles_played;
        }
        if strip.len() != best.strip.len() {
            return strip.len() < best.strip.len();
        }
        strip < best.strip.as_slice()
    }
}
