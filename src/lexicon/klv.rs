//! The leave evaluator.
//!
//! A rack's *leave value* is a signed equity adjustment for the tiles
//! kept back after a play. Values live in a flat table indexed by the
//! rank of the rack multiset in the ranking graph's canonical
//! enumeration; the rank is computed by walking the graph in sorted
//! machine-byte order, skipping the word counts of bypassed siblings.

use crate::{
    equity::Equity,
    error::{EngineError, EngineResult},
    game::rack::Rack,
    lexicon::kwg::{Kwg, NodeIndex},
};

/// A ranking graph paired with its leave-value table.
#[derive(Debug, Clone)]
pub struct Klv {
    kwg: Kwg,
    leaves: Vec<Equity>,
    word_counts: Vec<u32>,
}

impl Klv {
    /// Creates a leave evaluator, precomputing the per-node word counts
    /// used for ranking.
    pub fn new(kwg: Kwg, leaves: Vec<Equity>) -> Self {
        let word_counts = compute_word_counts(&kwg);
        Self {
            kwg,
            leaves,
            word_counts,
        }
    }
    /// The number of leave values in the table.
    pub fn leave_count(&self) -> usize {
        self.leaves.len()
    }

    /// The leave value of a rack. Empty racks and racks outside the
    /// enumeration's support are worth zero.
    pub fn leave_value(&self, rack: &Rack) -> Equity {
        match self.rack_index(rack) {
            Some(index) => self
                .leaves
                .get(index as usize)
                .copied()
                .unwrap_or(Equity::ZERO),
            None => Equity::ZERO,
        }
    }

    /// Ranks a rack in the canonical enumeration by walking the graph in
    /// ascending machine-byte order (blank first, then A..Z), with
    /// multiplicity.
    pub fn rack_index(&self, rack: &Rack) -> Option<u32> {
        if rack.is_empty() {
            return None;
        }

        let mut node_index = self.kwg.dawg_root();
        let mut index: u32 = 0;
        let mut remaining = rack.len();

        for byte in machine_bytes(rack) {
            // step along the sibling list to the arc for `byte`, adding
            // the word counts of everything passed over.
            loop {
                if node_index == 0 {
                    return None;
                }
                let node = self.kwg.node(node_index);
                if node.tile() == byte {
                    break;
                }
                if node.is_end() {
                    return None;
                }
                index += self.subtree_count(node_index);
                node_index += 1;
            }

            remaining -= 1;
            if remaining == 0 {
                return Some(index);
            }

            // descend: the leave ending at this arc ranks just before
            // its extensions.
            node_index = self.kwg.node(node_index).arc();
            index += 1;
        }

        None
    }
    /// Number of leaves reachable through the arc at `node_index` alone.
    fn subtree_count(&self, node_index: NodeIndex) -> u32 {
        let i = node_index as usize;
        self.word_counts[i] - self.word_counts[i + 1]
    }

    /// Serializes to the `.klv16` layout: the ranking graph, then a
    /// 32-bit value count, then the values as little-endian `i16`s.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.kwg.to_bytes();
        bytes.extend_from_slice(&(self.leaves.len() as u32).to_le_bytes());
        for leave in &self.leaves {
            bytes.extend_from_slice(&leave.eighths().to_le_bytes());
        }
        bytes
    }
    /// Deserializes from the `.klv16` layout.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let (kwg, mut offset) = Kwg::from_bytes(bytes)?;

        let count = bytes
            .get(offset..offset + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or(EngineError::TruncatedLeaves)? as usize;
        offset += 4;

        if bytes.len() < offset + count * 2 {
            return Err(EngineError::TruncatedLeaves);
        }
        let leaves = (0..count)
            .map(|i| {
                let at = offset + i * 2;
                Equity::from_eighths(i16::from_le_bytes([bytes[at], bytes[at + 1]]))
            })
            .collect();

        Ok(Self::new(kwg, leaves))
    }
}

/// The machine bytes of a rack in ascending order with multiplicity:
/// blanks (byte 0) first, then letters 1..=26.
fn machine_bytes(rack: &Rack) -> impl Iterator<Item = u8> + '_ {
    let counts = rack.counts();
    let blanks = std::iter::repeat(0u8).take(counts[26] as usize);
    let letters = (0..26u8)
        .flat_map(move |slot| std::iter::repeat(slot + 1).take(counts[slot as usize] as usize));
    blanks.chain(letters)
}

/// Counts, for every node, the number of complete leaves reachable from
/// it: 1 if its arc accepts, plus its child subtree, plus (unless it ends
/// the sibling list) the count of the next sibling.
///
/// Children may sit at lower indices than their parents, so the reverse
/// pass repeats until a pass makes no change; the leave depth bounds the
/// number of passes by the rack size.
fn compute_word_counts(kwg: &Kwg) -> Vec<u32> {
    let len = kwg.len();
    let mut counts = vec![0u32; len];

    let mut changed = true;
    while changed {
        changed = false;
        for i in (0..len).rev() {
            let node = kwg.node(i as NodeIndex);
            let mut count = u32::from(node.accepts());

            let arc = node.arc() as usize;
            if arc != 0 && arc < len {
                count += counts[arc];
            }
            if !node.is_end() && i + 1 < len {
                count += counts[i + 1];
            }

            if counts[i] != count {
                counts[i] = count;
                changed = true;
            }
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::tile::{Letter, Tile},
        lexicon::KlvBuilder,
    };

    fn rack(letters: &str) -> Rack {
        letters
            .chars()
            .map(|ch| match ch {
                '?' => Tile::blank(),
                _ => Tile::Letter(Letter::new(ch).unwrap()),
            })
            .collect()
    }

    fn sample() -> Klv {
        let mut builder = KlvBuilder::new();
        builder.insert("?", Equity::from_eighths(200));
        builder.insert("A", Equity::from_eighths(8));
        builder.insert("AB", Equity::from_eighths(-16));
        builder.insert("B", Equity::from_eighths(-4));
        builder.insert("BQ", Equity::from_eighths(-60));
        builder.insert("Q", Equity::from_eighths(-50));
        builder.build()
    }

    #[test]
    fn ranks_follow_sorted_enumeration(){
        let klv = sample();

        // sorted order: ?, A, AB, B, BQ, Q.
        assert_eq!(klv.rack_index(&rack("?")), Some(0));
        assert_eq!(klv.rack_index(&rack("A")), Some(1));
        assert_eq!(klv.rack_index(&rack("AB")), Some(2));
        assert_eq!(klv.rack_index(&rack("BA")), Some(2));
        assert_eq!(klv.rack_index(&rack("B")), Some(3));
        assert_eq!(klv.rack_index(&rack("QB")), Some(4));
        assert_eq!(klv.rack_index(&rack("Q")), Some(5));
    }

    #[test]
    fn leave_values_round_trip_through_rank() {
        let klv = sample();

        assert_eq!(klv.leave_value(&rack("?")).eighths(), 200);
        assert_eq!(klv.leave_value(&rack("BA")).eighths(), -16);
        assert_eq!(klv.leave_value(&rack("Q")).eighths(), -50);

        // outside the enumeration: zero.
        assert_eq!(klv.leave_value(&rack("Z")), Equity::ZERO);
        assert_eq!(klv.leave_value(&rack("AAA")), Equity::ZERO);
        // empty rack: zero.
        assert_eq!(klv.leave_value(&Rack::new()), Equity::ZERO);
    }

    #[test]
    fn klv16_round_trip() {
        let klv = sample();
        let bytes = klv.to_bytes();
        let loaded = Klv::from_bytes(&bytes).unwrap();

        assert_eq!(loaded.leave_count(), klv.leave_count());
        assert_eq!(loaded.leave_value(&rack("AB")).eighths(), -16);

        assert_eq!(
            Klv::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err(),
            EngineError::TruncatedLeaves
        );
    }
}
