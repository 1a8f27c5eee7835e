//! Anchors and their best-first processing order.
//!
//! An anchor is an empty square adjacent to a placed tile (or the board
//! centre on the opening move). Each anchor carries an upper bound on
//! the equity any play through it can reach; a max-heap hands anchors to
//! the generator in decreasing bound order so the remaining heap can be
//! discarded once the best play found beats the next bound.

use crate::{equity::Equity, game::play::Dir};
use std::{cmp::Ordering, collections::BinaryHeap};

/// A candidate starting square for plays in one direction.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    /// The scan direction.
    pub dir: Dir,
    /// The lane line: board row for across, board column for down.
    pub line: u8,
    /// The position of the anchor along its line.
    pub col: u8,
    /// The previous anchor's position on the same line. Leftward travel
    /// must stop strictly before it so each play is generated once.
    pub last_anchor_col: Option<u8>,
    /// Upper bound on the equity of any play through this anchor.
    pub bound: Equity,
    /// Canonical scan order, used to break bound ties exactly as a
    /// plain scan would.
    pub scan_order: u16,
}

impl Anchor {
    /// The canonical scan order of an anchor: across anchors first in
    /// row-major order, then down anchors in column-major order.
    pub fn scan_order_of(dir: Dir, line: usize, col: usize) -> u16 {
        let offset = match dir {
            Dir::Across => 0,
            Dir::Down => 225,
        };
        (offset + line * 15 + col) as u16
    }
}

impl PartialEq for Anchor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Anchor {}
impl PartialOrd for Anchor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Anchor {
    fn cmp(&self, other: &Self) -> Ordering {
        // higher bound first; equal bounds fall back to scan order,
        // earlier anchors winning.
        self.bound
            .cmp(&other.bound)
            .then_with(|| other.scan_order.cmp(&self.scan_order))
    }
}

/// A max-heap of anchors keyed by bound then scan order.
pub type AnchorHeap = BinaryHeap<Anchor>;
