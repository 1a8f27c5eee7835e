//! The compressed word graph.
//!
//! Nodes are packed 32-bit records laid out as:
//!
//! ```text
//! bits 31..24  tile (0 = separator, 1..=26 = A..Z)
//! bit  23      accepts: the path ending at this arc spells a word
//! bit  22      end-of-siblings: last arc in its sibling list
//! bits 21..0   arc target: index of the first child node, 0 for none
//! ```
//!
//! The node at index 0 points at the DAWG root (forward dictionary); the
//! node at index 1 points at the GADDAG root (bidirectional). Sibling
//! lists are contiguous runs terminated by the end-of-siblings flag.

use crate::{
    error::{EngineError, EngineResult},
    game::tile::{Letter, LetterSet},
};

/// The machine byte used as the GADDAG separator.
pub const SEPARATOR: u8 = 0;

/// Index of a node within the graph's node array. Zero doubles as the
/// "no arc" sentinel.
pub type NodeIndex = u32;

const ACCEPTS_FLAG: u32 = 0x0080_0000;
const IS_END_FLAG: u32 = 0x0040_0000;
const ARC_INDEX_MASK: u32 = 0x003F_FFFF;
const TILE_SHIFT: u32 = 24;

/// A packed word-graph node.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node(u32);

impl Node {
    /// Packs the fields of a node.
    pub fn pack(tile: u8, accepts: bool, is_end: bool, arc: NodeIndex) -> Self {
        debug_assert!(tile <= 26);
        debug_assert!(arc <= ARC_INDEX_MASK);
        let mut bits = (u32::from(tile) << TILE_SHIFT) | arc;
        if accepts {
            bits |= ACCEPTS_FLAG;
        }
        if is_end {
            bits |= IS_END_FLAG;
        }
        Node(bits)
    }
    /// The raw packed value.
    pub fn bits(self) -> u32 {
        self.0
    }
    /// The machine byte on the arc (0 is the separator).
    pub fn tile(self) -> u8 {
        (self.0 >> TILE_SHIFT) as u8
    }
    /// Whether the path ending at this arc spells a complete word.
    pub fn accepts(self) -> bool {
        self.0 & ACCEPTS_FLAG != 0
    }
    /// Whether this arc is the last in its sibling list.
    pub fn is_end(self) -> bool {
        self.0 & IS_END_FLAG != 0
    }
    /// Index of the first child node, or 0 for none.
    pub fn arc(self) -> NodeIndex {
        self.0 & ARC_INDEX_MASK
    }
}
impl From<u32> for Node {
    fn from(bits: u32) -> Self {
        Node(bits)
    }
}

/// An immutable word graph holding both dictionary roots. Loaded once
/// and shared read-only by every generation call.
#[derive(Debug, Clone)]
pub struct Kwg {
    nodes: Vec<Node>,
}

impl Kwg {
    /// Wraps a packed node array. The first two entries must be the root
    /// pointer records.
    pub fn new(nodes: Vec<Node>) -> Self {
        debug_assert!(nodes.len() >= 2);
        Self { nodes }
    }
    /// The number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    /// Checks whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    /// Reads the node at `index`.
    pub fn node(&self, index: NodeIndex) -> Node {
        self.nodes[index as usize]
    }
    /// Root of the forward dictionary.
    pub fn dawg_root(&self) -> NodeIndex {
        self.nodes[0].arc()
    }
    /// Root of the bidirectional graph.
    pub fn gaddag_root(&self) -> NodeIndex {
        self.nodes[1].arc()
    }

    /// Scans the sibling list starting at `node_index` for an arc
    /// carrying `tile`, returning its arc target. Returns 0 when the
    /// tile is absent or `node_index` is itself 0 (fell off the graph).
    pub fn follow_arc(&self, node_index: NodeIndex, tile: u8) -> NodeIndex {
        if node_index == 0 {
            return 0;
        }
        let mut i = node_index;
        loop {
            let node = self.node(i);
            if node.tile() == tile {
                return node.arc();
            }
            if node.is_end() {
                return 0;
            }
            i += 1;
        }
    }
    /// Follows the arc for a letter.
    pub fn follow_letter(&self, node_index: NodeIndex, letter: Letter) -> NodeIndex {
        self.follow_arc(node_index, letter.index())
    }
    /// Follows the separator arc.
    pub fn follow_separator(&self, node_index: NodeIndex) -> NodeIndex {
        self.follow_arc(node_index, SEPARATOR)
    }
    /// Scans the sibling list for `letter` and reports whether its arc
    /// accepts.
    pub fn letter_accepts(&self, node_index: NodeIndex, letter: Letter) -> bool {
        if node_index == 0 {
            return false;
        }
        let mut i = node_index;
        loop {
            let node = self.node(i);
            if node.tile() == letter.index() {
                return node.accepts();
            }
            if node.is_end() {
                return false;
            }
            i += 1;
        }
    }
    /// One pass over the sibling list building the set of letters whose
    /// arc accepts and the set of all letters present. The separator is
    /// ignored.
    pub fn letter_sets(&self, node_index: NodeIndex) -> (LetterSet, LetterSet) {
        let mut accept_set = LetterSet::EMPTY;
        let mut extension_set = LetterSet::EMPTY;
        for (letter, accepts, _) in self.siblings(node_index) {
            extension_set.insert(letter);
            if accepts {
                accept_set.insert(letter);
            }
        }
        (accept_set, extension_set)
    }
    /// An iterator over the letter arcs in the sibling list at
    /// `node_index`, skipping the separator. Yields
    /// `(letter, accepts, arc target)`.
    pub fn siblings(&self, node_index: NodeIndex) -> Siblings<'_> {
        Siblings {
            kwg: self,
            next: match node_index {
                0 => None,
                i => Some(i),
            },
        }
    }

    /// Checks whether a sequence of letters is a dictionary word.
    pub fn is_word(&self, letters: &[Letter]) -> bool {
        if letters.len() < 2 {
            return false;
        }
        let mut node_index = self.dawg_root();
        for (i, &letter) in letters.iter().enumerate() {
            if i == letters.len() - 1 {
                return self.letter_accepts(node_index, letter);
            }
            node_index = self.follow_letter(node_index, letter);
            if node_index == 0 {
                return false;
            }
        }
        false
    }

    /// Computes the set of letters `L` such that `prefix ‖ L ‖ suffix` is
    /// a dictionary word. The empty prefix and suffix yield the
    /// all-letters set (no cross word is formed).
    pub fn cross_set(&self, prefix: &[Letter], suffix: &[Letter]) -> LetterSet {
        if prefix.is_empty() && suffix.is_empty() {
            return LetterSet::ALL;
        }

        // traverse the forward dictionary through the prefix.
        let mut node_index = self.dawg_root();
        for &letter in prefix {
            node_index = self.follow_letter(node_index, letter);
            if node_index == 0 {
                return LetterSet::EMPTY;
            }
        }

        let mut result = LetterSet::EMPTY;
        for (letter, accepts, arc) in self.siblings(node_index) {
            let valid = match suffix.is_empty() {
                true => accepts,
                false => self.follows_to_word(arc, suffix),
            };
            if valid {
                result.insert(letter);
            }
        }
        result
    }
    /// Follows `suffix` from `node_index`, reporting whether the final
    /// arc accepts.
    fn follows_to_word(&self, node_index: NodeIndex, suffix: &[Letter]) -> bool {
        let mut node_index = node_index;
        for (i, &letter) in suffix.iter().enumerate() {
            if i == suffix.len() - 1 {
                return self.letter_accepts(node_index, letter);
            }
            node_index = self.follow_letter(node_index, letter);
            if node_index == 0 {
                return false;
            }
        }
        false
    }

    /// Computes the extension sets for a square given the runs of placed
    /// tiles abutting it in the line direction.
    ///
    /// Returns `(leftx, rightx)` where `leftx` holds the front hooks of
    /// the `right` run (letters that may precede it) and `rightx` holds
    /// the back hooks of the `left` run (letters that may follow it). An
    /// absent run yields the all-letters set.
    pub fn extension_sets(&self, left: &[Letter], right: &[Letter]) -> (LetterSet, LetterSet) {
        // Back hooks: traverse the reversed left run, cross the
        // separator, and read the letters available after it.
        let rightx = match left.is_empty() {
            true => LetterSet::ALL,
            false => {
                let node_index = self.traverse_reversed(left);
                let sep = self.follow_separator(node_index);
                match sep {
                    0 => LetterSet::EMPTY,
                    _ => self.letter_sets(sep).1,
                }
            }
        };

        // Front hooks: traverse the reversed right run; the letters at
        // that node are the ones that may continue leftward.
        let leftx = match right.is_empty() {
            true => LetterSet::ALL,
            false => {
                let node_index = self.traverse_reversed(right);
                match node_index {
                    0 => LetterSet::EMPTY,
                    _ => self.letter_sets(node_index).1,
                }
            }
        };

        (leftx, rightx)
    }
    /// Traverses the GADDAG through a run of letters in reverse order.
    fn traverse_reversed(&self, run: &[Letter]) -> NodeIndex {
        let mut node_index = self.gaddag_root();
        for &letter in run.iter().rev() {
            node_index = self.follow_letter(node_index, letter);
            if node_index == 0 {
                return 0;
            }
        }
        node_index
    }

    /// Serializes the graph to the little-endian on-disk layout: a 32-bit
    /// node count followed by the packed nodes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.nodes.len() * 4);
        bytes.extend_from_slice(&(self.nodes.len() as u32).to_le_bytes());
        for node in &self.nodes {
            bytes.extend_from_slice(&node.bits().to_le_bytes());
        }
        bytes
    }
    /// Deserializes a graph from the little-endian on-disk layout,
    /// returning the graph and the number of bytes consumed.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<(Self, usize)> {
        let count = read_u32(bytes, 0)? as usize;
        let end = 4 + count * 4;
        if bytes.len() < end {
            return Err(EngineError::TruncatedLexicon);
        }
        let nodes = (0..count)
            .map(|i| read_u32(bytes, 4 + i * 4).map(Node::from))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok((Self::new(nodes), end))
    }
}

/// Reads a little-endian `u32` at `offset`.
fn read_u32(bytes: &[u8], offset: usize) -> EngineResult<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(EngineError::TruncatedLexicon)
}

/// Iterator over the letter arcs in a sibling list.
pub struct Siblings<'a> {
    kwg: &'a Kwg,
    next: Option<NodeIndex>,
}
impl Iterator for Siblings<'_> {
    type Item = (Letter, bool, NodeIndex);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let i = self.next?;
            let node = self.kwg.node(i);
            self.next = match node.is_end() {
                true => None,
                false => Some(i + 1),
            };

            // separator arcs are not letters.
            if let Some(letter) = Letter::from_index(node.tile()) {
                return Some((letter, node.accepts(), node.arc()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::KwgBuilder;

    fn letters(word: &str) -> Vec<Letter> {
        word.chars().filter_map(Letter::new).collect()
    }

    fn sample() -> Kwg {
        KwgBuilder::from_words(["CARE", "CARS", "CAT", "EAR", "EARS"]).build()
    }

    #[test]
    fn node_packing() {
        let node = Node::pack(17, true, false, 0x3F_FFFF);
        assert_eq!(node.tile(), 17);
        assert!(node.accepts());
        assert!(!node.is_end());
        assert_eq!(node.arc(), 0x3F_FFFF);

        let end = Node::pack(0, false, true, 0);
        assert!(end.is_end());
        assert_eq!(end.tile(), SEPARATOR);
    }

    #[test]
    fn validates_words() {
        let kwg = sample();
        assert!(kwg.is_word(&letters("CAT")));
        assert!(kwg.is_word(&letters("EARS")));
        assert!(!kwg.is_word(&letters("CA")));
        assert!(!kwg.is_word(&letters("ART")));
        // one-letter sequences are never words.
        assert!(!kwg.is_word(&letters("C")));
    }

    #[test]
    fn cross_set_with_prefix_and_suffix() {
        let kwg = sample();

        // C ‖ L ‖ T: only CAT works.
        let set = kwg.cross_set(&letters("C"), &letters("T"));
        assert_eq!(set.only(), Some(Letter::new('A').unwrap()));

        // EAR ‖ L: only EARS.
        let set = kwg.cross_set(&letters("EAR"), &[]);
        assert_eq!(set.only(), Some(Letter::new('S').unwrap()));

        // no neighbours at all: everything goes.
        assert_eq!(kwg.cross_set(&[], &[]), LetterSet::ALL);

        // a prefix that is not in the dictionary prunes to nothing.
        assert!(kwg.cross_set(&letters("ZZ"), &[]).is_empty());
    }

    #[test]
    fn extension_sets_find_hooks() {
        let kwg = sample();

        // letters that may follow CAR: E (CARE) and S (CARS).
        let (_, rightx) = kwg.extension_sets(&letters("CAR"), &[]);
        assert!(rightx.contains(Letter::new('E').unwrap()));
        assert!(rightx.contains(Letter::new('S').unwrap()));
        assert!(!rightx.contains(Letter::new('T').unwrap()));

        // letters that may precede AR: C (CARE..) and E (EAR..).
        let (leftx, _) = kwg.extension_sets(&[], &letters("AR"));
        assert!(leftx.contains(Letter::new('C').unwrap()));
        assert!(leftx.contains(Letter::new('E').unwrap()));

        // empty runs leave both sets unconstrained.
        let (leftx, rightx) = kwg.extension_sets(&[], &[]);
        assert_eq!(leftx, LetterSet::ALL);
        assert_eq!(rightx, LetterSet::ALL);
    }

    #[test]
    fn byte_round_trip() {
        let kwg = sample();
        let bytes = kwg.to_bytes();
        let (loaded, consumed) = Kwg::from_bytes(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(loaded.len(), kwg.len());
        assert!(loaded.is_word(&letters("CARE")));
        assert!(!loaded.is_word(&letters("SCAR")));

        // truncation is detected.
        assert_eq!(
            Kwg::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err(),
            EngineError::TruncatedLexicon
        );
    }
}
