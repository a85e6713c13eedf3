use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use bit_set::BitSet;

use crate::color::{Color, VertexId};
use crate::score::{Move, MoveOrder};

/** Addressable binary heap over the N×K moves of a k-coloring.

The key space is fixed by [`MovesQueue::build`]: afterwards moves are never
inserted or removed, only their score is changed. index[id] is the heap slot of
the move of identifier id (see [`Move::id`]), and heap[index[id]].id() == id
holds after every operation.
*/
#[derive(Debug)]
pub struct MovesQueue<O:MoveOrder> {
    /// number of colors
    k: usize,
    /// heap[slot]: move stored in the slot (heap[0] is the best move)
    heap: Vec<Move>,
    /// index[id]: slot of the move id
    index: Vec<usize>,
    order: PhantomData<O>,
}

impl<O:MoveOrder> Default for MovesQueue<O> {
    fn default() -> Self {
        Self { k: 0, heap: Vec::new(), index: Vec::new(), order: PhantomData }
    }
}

impl<O:MoveOrder> MovesQueue<O> {

    /// number of moves in the queue
    pub fn len(&self) -> usize { self.heap.len() }

    /// true iff the queue holds no move
    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    /// best move of the queue (feasible or not)
    pub fn peek(&self) -> Option<&Move> { self.heap.first() }

    /// current value of the move (node, to)
    pub fn get(&self, node:VertexId, to:Color) -> &Move {
        &self.heap[self.index[node * self.k + to]]
    }

    /** replaces the queue content by the given moves (one per (node,color) pair
    of a k-coloring, in any order) and heapifies it in O(n).
    */
    pub fn build(&mut self, moves:Vec<Move>, k:usize) {
        self.k = k;
        self.heap = moves;
        self.index = vec![usize::MAX ; self.heap.len()];
        for (slot,m) in self.heap.iter().enumerate() {
            let id = m.id(k);
            debug_assert!(id < self.index.len() && self.index[id] == usize::MAX);
            self.index[id] = slot;
        }
        for slot in (0..self.heap.len()/2).rev() {
            self.sift_down(slot);
        }
    }

    /** changes the score of a move already in the queue. O(log n) */
    pub fn change(&mut self, m:Move) {
        let slot = self.index[m.id(self.k)];
        let previous = self.heap[slot];
        debug_assert_eq!((previous.node, previous.to), (m.node, m.to));
        self.heap[slot] = m;
        if self.better(&m, &previous) {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
    }

    /** returns the moves tied with the best feasible move that satisfy keep,
    at most capacity of them.
    A move is feasible if its node has some conflict (conflicts[node*k + coloring[node]] > 0),
    it changes the color of the node and its id is not marked.

    The heap is explored best-first from the root. Since a slot is never better than its
    parent, the exploration stops as soon as the next slot is worse than the best feasible
    move found. Moves rejected by keep still set the best key but use no capacity.
    Moves are returned in the queue order.
    */
    pub fn head<F>(&self, coloring:&[Color], conflicts:&[u32], marked:&BitSet, capacity:usize, keep:F) -> Vec<Move>
    where F: Fn(&Move) -> bool {
        let mut res = Vec::new();
        if self.heap.is_empty() || capacity == 0 { return res; }
        let mut frontier:BinaryHeap<Reverse<(i64, usize, usize)>> = BinaryHeap::new();
        frontier.push(Reverse(self.entry(0)));
        let mut best_key:Option<i64> = None;
        while let Some(Reverse((key, id, slot))) = frontier.pop() {
            if matches!(best_key, Some(b) if key > b) { break; }
            let m = &self.heap[slot];
            let current = coloring[m.node];
            if m.to != current && conflicts[m.node * self.k + current] > 0 && !marked.contains(id) {
                best_key = Some(key);
                if keep(m) {
                    res.push(*m);
                    if res.len() >= capacity { break; }
                }
            }
            for child in [2*slot+1, 2*slot+2] {
                if child < self.heap.len() {
                    frontier.push(Reverse(self.entry(child)));
                }
            }
        }
        res
    }

    /// (key, id, slot) of a slot, ordered as the queue
    fn entry(&self, slot:usize) -> (i64, usize, usize) {
        let m = &self.heap[slot];
        (O::key(m), m.id(self.k), slot)
    }

    /// true iff a is strictly before b
    #[inline]
    fn better(&self, a:&Move, b:&Move) -> bool {
        (O::key(a), a.id(self.k)) < (O::key(b), b.id(self.k))
    }

    /// swaps two slots and keeps the index up to date
    #[inline]
    fn swap(&mut self, a:usize, b:usize) {
        self.heap.swap(a, b);
        self.index[self.heap[a].id(self.k)] = a;
        self.index[self.heap[b].id(self.k)] = b;
    }

    fn sift_up(&mut self, mut slot:usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.better(&self.heap[slot], &self.heap[parent]) { break; }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot:usize) {
        let n = self.heap.len();
        loop {
            let left = 2*slot + 1;
            let right = left + 1;
            let mut best = slot;
            if left < n && self.better(&self.heap[left], &self.heap[best]) { best = left; }
            if right < n && self.better(&self.heap[right], &self.heap[best]) { best = right; }
            if best == slot { break; }
            self.swap(slot, best);
            slot = best;
        }
    }

    /// checks the heap order and the index (used by the tests)
    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        self.heap.iter().enumerate().all(|(slot,m)| {
            self.index[m.id(self.k)] == slot
            && (slot == 0 || !self.better(m, &self.heap[(slot-1)/2]))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use fastrand::Rng;
    use crate::score::{ConflictOrder, DeltaScore, TotalOrder};

    fn mv(node:usize, to:usize, conflicts:i64, total:i64) -> Move {
        Move { node, to, delta: DeltaScore { conflicts, guidance: 0, total } }
    }

    fn random_moves(rng:&mut Rng, n:usize, k:usize) -> Vec<Move> {
        let mut moves:Vec<Move> = (0..n*k)
            .map(|id| mv(id / k, id % k, rng.i64(-3..4), rng.i64(-30..40)))
            .collect();
        rng.shuffle(&mut moves);
        moves
    }

    #[test]
    fn test_build_and_change_keep_invariants() {
        let mut rng = Rng::with_seed(7);
        let (n,k) = (13, 5);
        let mut queue:MovesQueue<TotalOrder> = MovesQueue::default();
        queue.build(random_moves(&mut rng, n, k), k);
        assert_eq!(queue.len(), n*k);
        assert!(queue.is_valid());
        for _ in 0..2000 {
            let m = mv(rng.usize(0..n), rng.usize(0..k), 0, rng.i64(-50..50));
            queue.change(m);
            assert!(queue.is_valid());
            assert_eq!(*queue.get(m.node, m.to), m);
        }
        // the root is the minimum (total, id)
        let best = (0..n*k)
            .map(|id| queue.get(id / k, id % k))
            .min_by_key(|m| (m.delta.total, m.id(k)))
            .copied();
        assert_eq!(queue.peek().copied(), best);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let mut queue:MovesQueue<ConflictOrder> = MovesQueue::default();
        let moves = vec![mv(1,1,-1,0), mv(0,0,0,0), mv(1,0,-1,0), mv(0,1,-1,0)];
        queue.build(moves, 2);
        assert!(queue.is_valid());
        assert_eq!((queue.peek().unwrap().node, queue.peek().unwrap().to), (0,1));
    }

    #[test]
    fn test_head_skips_infeasible_moves() {
        // coloring [0,0,1], k=2. conflicts table rows: node0 has 1 conflict on color 0,
        // node1 has 1 conflict on color 0, node2 has none
        let coloring = vec![0,0,1];
        let conflicts:Vec<u32> = vec![1,0, 1,0, 2,0];
        let mut queue:MovesQueue<TotalOrder> = MovesQueue::default();
        queue.build(vec![
            mv(0,0,0,0), mv(0,1,-1,-10),
            mv(1,0,0,0), mv(1,1,-1,-10),
            mv(2,0,2,-50), mv(2,1,0,0), // best move, but node 2 has no conflict
        ], 2);
        assert_eq!(queue.peek().unwrap().node, 2);
        let head = queue.head(&coloring, &conflicts, &BitSet::new(), 8, |_| true);
        assert_eq!(head.iter().map(|m| (m.node, m.to)).collect::<Vec<_>>(), vec![(0,1),(1,1)]);
        let head = queue.head(&coloring, &conflicts, &BitSet::new(), 1, |_| true);
        assert_eq!(head.iter().map(|m| (m.node, m.to)).collect::<Vec<_>>(), vec![(0,1)]);
    }

    #[test]
    fn test_head_marked_and_kept_moves() {
        let coloring = vec![0,0,1];
        let conflicts:Vec<u32> = vec![1,0, 1,0, 0,1];
        let mut queue:MovesQueue<ConflictOrder> = MovesQueue::default();
        queue.build(vec![
            mv(0,0,0,0), mv(0,1,-1,-10),
            mv(1,0,0,0), mv(1,1,-1,20),
            mv(2,0,-1,5), mv(2,1,0,0),
        ], 2);
        // a marked move is not feasible
        let mut marked = BitSet::new();
        marked.insert(1);
        let head = queue.head(&coloring, &conflicts, &marked, 8, |_| true);
        assert_eq!(head.iter().map(|m| m.id(2)).collect::<Vec<_>>(), vec![3,4]);
        // rejected ties use no capacity
        let head = queue.head(&coloring, &conflicts, &BitSet::new(), 1, |m| m.delta.total > 0);
        assert_eq!(head.iter().map(|m| m.id(2)).collect::<Vec<_>>(), vec![3]);
        // rejected moves still fix the best key
        let head = queue.head(&coloring, &conflicts, &BitSet::new(), 8, |m| m.delta.conflicts == 0);
        assert!(head.is_empty());
    }

    #[test]
    fn test_head_matches_full_scan() {
        let mut rng = Rng::with_seed(3);
        let (n,k) = (20, 4);
        for _ in 0..50 {
            let coloring:Vec<usize> = (0..n).map(|_| rng.usize(0..k)).collect();
            let conflicts:Vec<u32> = (0..n*k).map(|_| rng.u32(0..2)).collect();
            let mut queue:MovesQueue<TotalOrder> = MovesQueue::default();
            queue.build(random_moves(&mut rng, n, k), k);
            let feasible:Vec<Move> = (0..n*k)
                .map(|id| *queue.get(id / k, id % k))
                .filter(|m| m.to != coloring[m.node] && conflicts[m.node*k + coloring[m.node]] > 0)
                .collect();
            let head = queue.head(&coloring, &conflicts, &BitSet::new(), n*k, |_| true);
            match feasible.iter().map(|m| m.delta.total).min() {
                None => assert!(head.is_empty()),
                Some(best) => {
                    let mut expected:Vec<usize> = feasible.iter()
                        .filter(|m| m.delta.total == best)
                        .map(|m| m.id(k))
                        .collect();
                    expected.sort_unstable();
                    let ids:Vec<usize> = head.iter().map(|m| m.id(k)).collect();
                    assert_eq!(ids, expected);
                }
            }
        }
    }
}
