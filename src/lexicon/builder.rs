//! Compiles word lists into packed node arrays.
//!
//! [`KwgBuilder`] produces the shared DAWG + GADDAG array used for move
//! generation; [`KlvBuilder`] produces the smaller leave graph paired with
//! its value table. Neither performs suffix minimization: the packed
//! format does not require it, and the builders exist for tooling and
//! tests rather than shipping tournament lexicons.

use crate::{
    equity::Equity,
    game::tile::Letter,
    lexicon::{
        klv::Klv,
        kwg::{Kwg, Node, NodeIndex, SEPARATOR},
    },
};
use std::collections::BTreeMap;

/// A node in the intermediate trie. Keys are machine bytes so the
/// separator (0) always sorts first.
#[derive(Debug, Default)]
struct TrieNode {
    accepts: bool,
    children: BTreeMap<u8, TrieNode>,
}

impl TrieNode {
    fn insert(&mut self, path: &[u8]) {
        match path.split_first() {
            None => self.accepts = true,
            Some((&byte, rest)) => self.children.entry(byte).or_default().insert(rest),
        }
    }
}

/// Builds a [`Kwg`] from a list of words.
#[derive(Debug, Default)]
pub struct KwgBuilder {
    dawg: TrieNode,
    gaddag: TrieNode,
}

impl KwgBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }
    /// Creates a builder holding every word in `words`. Words that
    /// contain characters outside the latin alphabet are skipped.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::new();
        for word in words {
            builder.insert(word.as_ref());
        }
        builder
    }
    /// Inserts a single word.
    pub fn insert(&mut self, word: &str) {
        let bytes: Vec<u8> = match word.chars().map(Letter::new).collect::<Option<Vec<_>>>() {
            Some(letters) => letters.iter().map(|l| l.index()).collect(),
            None => return,
        };
        if bytes.len() < 2 {
            return;
        }

        self.dawg.insert(&bytes);

        // GADDAG: for every split i in [1, n], store the reversed prefix,
        // the separator, then the suffix. The whole-word reversal carries
        // no separator.
        let mut path = Vec::with_capacity(bytes.len() + 1);
        for i in 1..=bytes.len() {
            path.clear();
            path.extend(bytes[..i].iter().rev());
            if i < bytes.len() {
                path.push(SEPARATOR);
                path.extend_from_slice(&bytes[i..]);
            }
            self.gaddag.insert(&path);
        }
    }
    /// Packs both tries into a single node array.
    pub fn build(self) -> Kwg {
        let mut nodes = vec![Node::pack(0, false, false, 0); 2];
        let dawg_root = emit_children(&mut nodes, &self.dawg);
        let gaddag_root = emit_children(&mut nodes, &self.gaddag);

        nodes[0] = Node::pack(0, false, false, dawg_root);
        nodes[1] = Node::pack(0, false, true, gaddag_root);
        Kwg::new(nodes)
    }
}

/// Emits the children of `node` as a contiguous sibling run, returning
/// the index of the first sibling (0 when there are none).
fn emit_children(nodes: &mut Vec<Node>, node: &TrieNode) -> NodeIndex {
    if node.children.is_empty() {
        return 0;
    }

    let start = nodes.len();
    nodes.resize(start + node.children.len(), Node::pack(0, false, false, 0));

    for (i, (&tile, child)) in node.children.iter().enumerate() {
        let arc = emit_children(nodes, child);
        let is_end = i == node.children.len() - 1;
        nodes[start + i] = Node::pack(tile, child.accepts, is_end, arc);
    }

    start as NodeIndex
}

/// Builds a [`Klv`] from explicit (rack, value) pairs.
///
/// Entries are keyed by the sorted machine bytes of the rack, so the
/// ranking DAWG enumerates them in exactly the order the value table is
/// laid out.
#[derive(Debug, Default)]
pub struct KlvBuilder {
    entries: BTreeMap<Vec<u8>, Equity>,
}

impl KlvBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }
    /// Inserts a leave and its value. The rack is given as letters with
    /// `?` for a blank; invalid characters make the entry a no-op.
    pub fn insert(&mut self, rack: &str, value: Equity) {
        let mut bytes = Vec::with_capacity(rack.len());
        for ch in rack.chars() {
            match ch {
                '?' => bytes.push(SEPARATOR),
                _ => match Letter::new(ch) {
                    Some(letter) => bytes.push(letter.index()),
                    None => return,
                },
            }
        }
        if bytes.is_empty() {
            return;
        }
        bytes.sort_unstable();
        self.entries.insert(bytes, value);
    }
    /// Packs the ranking graph and value table into a [`Klv`].
    pub fn build(self) -> Klv {
        let mut trie = TrieNode::default();
        let mut leaves = Vec::with_capacity(self.entries.len());
        for (bytes, value) in &self.entries {
            trie.insert(bytes);
            leaves.push(*value);
        }

        let mut nodes = vec![Node::pack(0, false, false, 0); 2];
        let root = emit_children(&mut nodes, &trie);
        nodes[0] = Node::pack(0, false, false, root);
        nodes[1] = Node::pack(0, false, true, 0);

        Klv::new(Kwg::new(nodes), leaves)
    }
}
