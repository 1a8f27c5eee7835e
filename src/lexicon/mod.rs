//! Module containing the compressed word graph and the leave evaluator.
//!
//! A single immutable node array encodes both the forward dictionary
//! (DAWG) and the bidirectional GADDAG used for move generation. Leave
//! values live in a second, smaller graph that ranks rack multisets into
//! a value table.

mod builder;
mod klv;
mod kwg;

pub use builder::{KlvBuilder, KwgBuilder};
pub use klv::Klv;
pub use kwg::{Kwg, Node, NodeIndex, SEPARATOR};
