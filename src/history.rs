//! Ordered log of committed moves and its inverse.

use std::fmt;

use crate::notation::{format_sequence, Move};

/// Returns the sequence that undoes `moves`.
///
/// The order is reversed and every quarter turn changes direction; half turns
/// are kept as they are.
pub fn invert(moves: &[Move]) -> Vec<Move> {
    moves.iter().rev().map(|m| m.inverse()).collect()
}

/// Moves committed so far, oldest first.
///
/// Entries are never edited after they are appended, except by the explicit
/// coalescing path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveHistory {
    moves: Vec<Move>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a committed move.
    pub fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Appends a move, merging it with the last entry if both turn the same
    /// layer.
    ///
    /// `F` followed by `F` becomes `F2`; `F` followed by `F'` cancels both.
    pub fn push_coalesced(&mut self, m: Move) {
        let last = match self.moves.last() {
            Some(&last) if last.layer == m.layer => last,
            _ => {
                self.moves.push(m);
                return;
            }
        };
        self.moves.pop();
        let quarter_turns = last.quarter_turns() + m.quarter_turns();
        if let Some(merged) = Move::from_quarter_turns(m.layer, quarter_turns) {
            self.moves.push(merged);
        }
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Sequence undoing the whole history.
    pub fn inverse(&self) -> Vec<Move> {
        invert(&self.moves)
    }
}

impl fmt::Display for MoveHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_sequence(&self.moves))
    }
}
