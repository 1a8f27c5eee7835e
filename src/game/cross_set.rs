//! Incremental maintenance of cross-sets, cross-scores and extension
//! sets.
//!
//! An empty square's derived data depends only on the contiguous runs of
//! placed tiles abutting it, so after a move only the squares at the
//! fringe of the played word and of any cross-words it touches need
//! recomputing. A full rebuild exists for boards loaded from serialized
//! state; the incremental update must leave the board in exactly the
//! state a full rebuild would.

use crate::{
    equity::Equity,
    game::{
        board::{Board, COLS, ROWS},
        play::{Dir, Placement, StripCell},
        tile::{Letter, LetterSet},
    },
    lexicon::Kwg,
};

/// Recomputes the derived data of every square on the board.
pub fn rebuild_all(board: &mut Board, kwg: &Kwg) {
    for row in 0..ROWS {
        for col in 0..COLS {
            recompute_square(board, kwg, row, col);
        }
    }
}

/// Recomputes only the squares whose inputs changed when `placement`
/// was applied: the freshly occupied squares themselves, and the first
/// empty square beyond each run of tiles touching a fresh tile.
pub fn update_for_move(board: &mut Board, kwg: &Kwg, placement: &Placement) {
    let mut touched = [false; ROWS * COLS];

    for ((row, col), cell) in placement.positions().zip(&placement.strip) {
        if !matches!(cell, StripCell::Fresh(_)) {
            continue;
        }
        touched[row * COLS + col] = true;

        // walk outward through contiguous tiles; the empty square just
        // beyond each run is the one whose runs now include this tile.
        for (dr, dc) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
            let (mut r, mut c) = (row as i32, col as i32);
            loop {
                r += dr;
                c += dc;
                if !(0..ROWS as i32).contains(&r) || !(0..COLS as i32).contains(&c) {
                    break;
                }
                if board.is_empty_at(r as usize, c as usize) {
                    touched[r as usize * COLS + c as usize] = true;
                    break;
                }
            }
        }
    }

    for row in 0..ROWS {
        for col in 0..COLS {
            if touched[row * COLS + col] {
                recompute_square(board, kwg, row, col);
            }
        }
    }
}

/// Recomputes one square's cross data and extension sets in both lanes.
fn recompute_square(board: &mut Board, kwg: &Kwg, row: usize, col: usize) {
    let across_index = row * COLS + col;
    let down_index = col * ROWS + row;

    // occupied squares carry no sets at all.
    if !board.is_empty_at(row, col) {
        board.lane_mut(Dir::Across).clear_square(across_index);
        board.lane_mut(Dir::Down).clear_square(down_index);
        return;
    }

    let above = run(board, row, col, -1, 0);
    let below = run(board, row, col, 1, 0);
    let left = run(board, row, col, 0, -1);
    let right = run(board, row, col, 0, 1);

    // across lane: cross-words run vertically, extension runs
    // horizontally.
    let cross = cross_data(kwg, &above, &below);
    let (leftx, rightx) = kwg.extension_sets(&left.letters, &right.letters);
    let lane = board.lane_mut(Dir::Across);
    lane.set_cross_data(across_index, cross.0, cross.1);
    lane.set_extension_sets(across_index, leftx, rightx);

    // down lane: the roles swap.
    let cross = cross_data(kwg, &left, &right);
    let (leftx, rightx) = kwg.extension_sets(&above.letters, &below.letters);
    let lane = board.lane_mut(Dir::Down);
    lane.set_cross_data(down_index, cross.0, cross.1);
    lane.set_extension_sets(down_index, leftx, rightx);
}

/// A contiguous run of placed tiles abutting a square on one side.
struct Run {
    /// The letters in reading order (top-to-bottom or left-to-right).
    letters: Vec<Letter>,
    /// The summed tile scores, blanks contributing zero.
    score: Equity,
}

/// Collects the run of tiles starting one step from `(row, col)` in the
/// direction `(dr, dc)`. Runs walked backwards are returned in reading
/// order.
fn run(board: &Board, row: usize, col: usize, dr: i32, dc: i32) -> Run {
    let mut letters = Vec::new();
    let mut score = Equity::ZERO;

    let (mut r, mut c) = (row as i32, col as i32);
    loop {
        r += dr;
        c += dc;
        if !(0..ROWS as i32).contains(&r) || !(0..COLS as i32).contains(&c) {
            break;
        }
        match board.tile_at(r as usize, c as usize) {
            Some(tile) => {
                // the letter is always known for a placed tile.
                letters.push(tile.letter().expect("a placed tile has a letter"));
                score += tile.score();
            }
            None => break,
        }
    }

    if dr < 0 || dc < 0 {
        letters.reverse();
    }
    Run { letters, score }
}

/// The cross-set and cross-score for a square given its perpendicular
/// prefix and suffix runs.
fn cross_data(kwg: &Kwg, prefix: &Run, suffix: &Run) -> (LetterSet, Option<Equity>) {
    match prefix.letters.is_empty() && suffix.letters.is_empty() {
        true => (LetterSet::ALL, None),
        false => (
            kwg.cross_set(&prefix.letters, &suffix.letters),
            Some(prefix.score + suffix.score),
        ),
    }
}
