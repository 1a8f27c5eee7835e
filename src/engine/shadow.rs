//! The shadow pass: a cheap admissible upper bound per anchor.
//!
//! Instead of traversing the word graph, the shadow walk places
//! anonymous tiles outward from the anchor, tracking only square
//! multipliers and the squares where the cross data forces a single
//! letter. Rack tile scores sorted descending are paired with the
//! descending effective multipliers, which can never fall below what any
//! concrete assignment of tiles to squares achieves, so the recorded
//! bound dominates the equity of every legal play through the anchor.

use crate::{
    engine::{leave_map::LeaveMap, movegen::LineCache, GenConfig},
    equity::Equity,
    game::{
        board::COLS,
        rack::{Rack, RACK_SIZE},
        tile::{letter_score, LetterSet, Tile, ALPHABET_SIZE},
    },
};

/// Anchor-independent inputs of one shadow pass.
pub(crate) struct ShadowCtx<'a> {
    pub leave_map: &'a LeaveMap,
    pub config: &'a GenConfig,
    pub bag_count: usize,
    pub opp_rack_sum: Equity,
    pub rack_size: usize,
    /// Prefix sums of the rack's tile scores sorted ascending:
    /// `lowest_sums[k]` is the cheapest possible k-tile leave.
    pub lowest_sums: [i32; RACK_SIZE + 1],
}

impl<'a> ShadowCtx<'a> {
    pub fn new(
        leave_map: &'a LeaveMap,
        config: &'a GenConfig,
        rack: &Rack,
        bag_count: usize,
        opp_rack_sum: Equity,
    ) -> Self {
        let mut ascending: Vec<i32> = rack
            .iter()
            .map(|t| i32::from(t.score().eighths()))
            .collect();
        ascending.sort_unstable();

        let mut lowest_sums = [0i32; RACK_SIZE + 1];
        for k in 1..=ascending.len() {
            lowest_sums[k] = lowest_sums[k - 1] + ascending[k - 1];
        }

        Self {
            leave_map,
            config,
            bag_count,
            opp_rack_sum,
            rack_size: rack.len(),
            lowest_sums,
        }
    }
}

/// The mutable state of one anchor's shadow walk. Copied at each fork,
/// which doubles as the save/restore the walk otherwise needs.
#[derive(Clone)]
struct ShadowState {
    counts: [u8; ALPHABET_SIZE],
    rack_bits: LetterSet,
    blanks: u8,
    /// Scores of unconsumed rack tiles, sorted descending, in eighths.
    desc_scores: Vec<i32>,
    /// Letter multipliers of still-unrestricted positions, descending.
    letter_mults: Vec<i32>,
    /// Cross-word multiplier contributions of still-unrestricted
    /// positions, descending.
    cross_mults: Vec<i32>,
    restricted_main: i32,
    perp_score: i32,
    word_mult: i32,
    num_played: usize,
}

impl ShadowState {
    fn from_rack(rack: &Rack) -> Self {
        let mut desc_scores: Vec<i32> = rack
            .iter()
            .map(|t| i32::from(t.score().eighths()))
            .collect();
        desc_scores.sort_unstable_by(|a, b| b.cmp(a));

        Self {
            counts: *rack.counts(),
            rack_bits: rack.letter_set(),
            blanks: rack.counts()[26],
            desc_scores,
            letter_mults: Vec::with_capacity(RACK_SIZE),
            cross_mults: Vec::with_capacity(RACK_SIZE),
            restricted_main: 0,
            perp_score: 0,
            word_mult: 1,
            num_played: 0,
        }
    }

    fn exhausted(&self, ctx: &ShadowCtx) -> bool {
        self.num_played >= ctx.rack_size
    }

    /// Accumulates a played-through tile into the main word.
    fn absorb(&mut self, tile: Tile) {
        self.restricted_main += i32::from(tile.score().eighths());
    }

    /// Shadow-places a fresh tile at `col`. Returns false when nothing
    /// legal fits there.
    fn place(&mut self, line: &LineCache, col: usize, anchor_col: usize) -> bool {
        let possible_here = line.placement_set(col, anchor_col);
        let possible = match self.blanks > 0 {
            // a blank widens the choice to the whole cross data.
            true => possible_here,
            false => possible_here & self.rack_bits,
        };
        if possible.is_empty() {
            return false;
        }

        let (tile_mult, word_mult) = line.mults[col];
        let (tile_mult, word_mult) = (i32::from(tile_mult), i32::from(word_mult));
        self.word_mult *= word_mult;

        let cross = line.cross_scores[col];
        if let Some(base) = cross {
            self.perp_score += i32::from(base.eighths()) * word_mult;
        }

        match possible.only() {
            Some(letter) => {
                // the position is forced: account for it exactly, and
                // consume the cheapest tile that could serve so the
                // remaining pairing never undercounts.
                let slot = usize::from(letter);
                let has_explicit = self.counts[slot] > 0;
                let had_blank = self.blanks > 0;
                let tile_score = match has_explicit {
                    true => i32::from(letter_score(letter).eighths()),
                    false => 0,
                };

                self.restricted_main += tile_score * tile_mult;
                if cross.is_some() {
                    self.perp_score += tile_score * tile_mult * word_mult;
                }

                if has_explicit {
                    self.counts[slot] -= 1;
                    if self.counts[slot] == 0 {
                        self.rack_bits = self
                            .rack_bits
                            .iter()
                            .filter(|&l| l != letter)
                            .collect();
                    }
                } else {
                    self.blanks -= 1;
                }
                self.remove_score(match had_blank {
                    true => 0,
                    false => tile_score,
                });
            }
            None => {
                insert_descending(&mut self.letter_mults, tile_mult);
                insert_descending(
                    &mut self.cross_mults,
                    match cross.is_some() {
                        true => tile_mult * word_mult,
                        false => 0,
                    },
                );
            }
        }

        self.num_played += 1;
        true
    }

    fn remove_score(&mut self, score: i32) {
        if let Some(at) = self.desc_scores.iter().position(|&s| s == score) {
            self.desc_scores.remove(at);
        }
    }

    /// Records the bound for the current extent, keeping the maximum.
    fn record(&self, ctx: &ShadowCtx, best: &mut Equity) {
        let pairs = self.letter_mults.len().min(self.desc_scores.len());
        let mut score = self.restricted_main * self.word_mult + self.perp_score;
        for j in 0..pairs {
            score += self.desc_scores[j] * (self.letter_mults[j] * self.word_mult + self.cross_mults[j]);
        }
        if self.num_played >= ctx.rack_size {
            score += i32::from(ctx.config.bingo_bonus.eighths());
        }

        let mut equity = score;
        if ctx.bag_count > 0 {
            let leave_size = ctx.rack_size - self.num_played;
            equity += i32::from(ctx.leave_map.best_for_size(leave_size).eighths());
        } else if self.num_played == ctx.rack_size {
            equity += 2 * i32::from(ctx.opp_rack_sum.eighths());
        } else {
            equity -= 2 * ctx.lowest_sums[ctx.rack_size - self.num_played];
            equity -= i32::from(ctx.config.non_outplay_penalty.eighths());
        }

        let equity = Equity::saturating_from(equity);
        if equity > *best {
            *best = equity;
        }
    }
}

/// Inserts into a descending-sorted vector, keeping it sorted.
fn insert_descending(values: &mut Vec<i32>, value: i32) {
    let at = values.partition_point(|&v| v >= value);
    values.insert(at, value);
}

/// Computes the upper bound on the equity of any play through the
/// anchor at `anchor_col`. Returns [`Equity::INITIAL`] when no play can
/// start there at all.
pub(crate) fn shadow_bound(
    ctx: &ShadowCtx,
    line: &LineCache,
    anchor_col: usize,
    last_anchor_col: Option<u8>,
    rack: &Rack,
) -> Equity {
    let mut best = Equity::INITIAL;
    if rack.is_empty() {
        return best;
    }

    let mut state = ShadowState::from_rack(rack);
    if !state.place(line, anchor_col, anchor_col) {
        return best;
    }

    // absorb the runs already abutting the anchor; any play through the
    // anchor includes them.
    let mut left_edge = anchor_col;
    while left_edge > 0 && !line.is_empty(left_edge - 1) {
        left_edge -= 1;
        state.absorb(line.tiles[left_edge].expect("occupied square"));
    }
    let mut right_edge = anchor_col;
    while right_edge < COLS - 1 && !line.is_empty(right_edge + 1) {
        right_edge += 1;
        state.absorb(line.tiles[right_edge].expect("occupied square"));
    }

    state.record(ctx, &mut best);
    extend_right(ctx, line, anchor_col, state.clone(), right_edge + 1, &mut best);

    // extend left one square at a time, forking a rightward excursion
    // from every leftward extent.
    let mut next_left = left_edge as i32 - 1;
    loop {
        if next_left < 0
            || Some(next_left as u8) == last_anchor_col
            || state.exhausted(ctx)
            || !state.place(line, next_left as usize, anchor_col)
        {
            return best;
        }
        next_left -= 1;

        // a run to the left belongs to every word reaching this square.
        while next_left >= 0 && !line.is_empty(next_left as usize) {
            state.absorb(line.tiles[next_left as usize].expect("occupied square"));
            next_left -= 1;
        }

        state.record(ctx, &mut best);
        extend_right(ctx, line, anchor_col, state.clone(), right_edge + 1, &mut best);
    }
}

/// Extends the shadow play rightward from `col`, recording a bound at
/// every extent.
fn extend_right(
    ctx: &ShadowCtx,
    line: &LineCache,
    anchor_col: usize,
    mut state: ShadowState,
    mut col: usize,
    best: &mut Equity,
) {
    loop {
        // trailing played-through tiles extend the word for free.
        while col < COLS && !line.is_empty(col) {
            state.absorb(line.tiles[col].expect("occupied square"));
            col += 1;
        }
        state.record(ctx, best);

        if col >= COLS || state.exhausted(ctx) || !state.place(line, col, anchor_col) {
            return;
        }
        col += 1;
    }
}
