use serde::Serialize;

use crate::color::{Color, VertexId};

/// weight of a conflicting edge in the total score
pub const CONFLICT_FACTOR:i64 = 10;

/** GLS score of a coloring at a given moment. */
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct Score {
    /// number of conflicting edges
    pub conflicts: i64,
    /// sum of the weights of the conflicting edges
    pub guidance: i64,
    /// 10*conflicts + λ*guidance if the guidance is in use, 10*conflicts otherwise
    pub total: i64,
}

impl Score {
    /// combines conflicts and guidance
    pub fn new(conflicts:i64, guidance:i64, lambda:Option<i64>) -> Self {
        Self { conflicts, guidance, total: total(conflicts, guidance, lambda) }
    }

    /// score obtained after applying a move of the given delta
    pub fn apply(&self, delta:&DeltaScore) -> Self {
        Self {
            conflicts: self.conflicts + delta.conflicts,
            guidance: self.guidance + delta.guidance,
            total: self.total + delta.total,
        }
    }
}

/** change of the score induced by a move (same layout as [`Score`], signed values) */
pub type DeltaScore = Score;

/// total score (lambda is None while the guidance is not in use)
pub fn total(conflicts:i64, guidance:i64, lambda:Option<i64>) -> i64 {
    match lambda {
        None => CONFLICT_FACTOR * conflicts,
        Some(l) => CONFLICT_FACTOR * conflicts + l * guidance,
    }
}


/** Candidate move: recolor `node` with `to`.
Its id (node*K + to) is a dense key over the N×K moves.
*/
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Move {
    /// vertex to recolor
    pub node: VertexId,
    /// new color of the vertex
    pub to: Color,
    /// score change induced by the move
    pub delta: DeltaScore,
}

impl Move {
    /// dense identifier of the move when k colors are used
    #[inline]
    pub fn id(&self, k:usize) -> usize { self.node * k + self.to }
}


/** Ordering of the moves within a moves queue. The best move has the smallest
(key, id) pair: ties on the key are broken by the smallest move id.
*/
pub trait MoveOrder: std::fmt::Debug {
    /// primary key (smaller is better)
    fn key(m:&Move) -> i64;
}

/// orders the moves by total score delta
#[derive(Debug)]
pub struct TotalOrder;

impl MoveOrder for TotalOrder {
    #[inline]
    fn key(m:&Move) -> i64 { m.delta.total }
}

/// orders the moves by conflicts delta (aspiration)
#[derive(Debug)]
pub struct ConflictOrder;

impl MoveOrder for ConflictOrder {
    #[inline]
    fn key(m:&Move) -> i64 { m.delta.conflicts }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total() {
        assert_eq!(Score::new(3, 7, None).total, 30);
        assert_eq!(Score::new(3, 7, Some(2)).total, 44);
    }

    #[test]
    fn test_apply() {
        let score = Score::new(3, 2, Some(1));
        let delta = DeltaScore { conflicts: -1, guidance: -2, total: -12 };
        assert_eq!(score.apply(&delta), Score::new(2, 0, Some(1)));
    }

    #[test]
    fn test_orders() {
        let m = Move { node: 2, to: 1, delta: DeltaScore { conflicts: -1, guidance: 3, total: 20 } };
        assert_eq!(m.id(4), 9);
        assert_eq!(TotalOrder::key(&m), 20);
        assert_eq!(ConflictOrder::key(&m), -1);
    }
}
