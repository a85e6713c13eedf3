use std::ops::Range;

use bit_set::BitSet;

/** Vertex Id */
pub type VertexId = usize;

/** Edge Id: canonical index of an undirected edge, in [0, m) */
pub type EdgeId = usize;

/** Color Id */
pub type Color = usize;

/** Coloring of a graph: coloring[v] is the color of the vertex v */
pub type Coloring = Vec<Color>;

/** Solution of a graph coloring problem (represented as a partition). */
pub type Solution = Vec<Vec<VertexId>>;

/** models a Graph Coloring instance.

The search never mutates the instance. Each undirected edge (u,v) appears in both
adjacency lists, and both entries share the same canonical [`EdgeId`], so that
per-edge data (weights) can be stored in a single vector of size m.
*/
pub trait ColoringInstance: std::fmt::Debug {
    /// number of vertices
    fn nb_vertices(&self) -> usize;

    /// number of (undirected) edges
    fn nb_edges(&self) -> usize;

    /// list of vertices adjacent to u
    fn neighbors(&self, u:VertexId) -> &[VertexId];

    /// incident_edges(u)[i]: edge id of (u, neighbors(u)[i])
    fn incident_edges(&self, u:VertexId) -> &[EdgeId];

    /// slots of u within the adjacency arrays (contiguous)
    fn edge_range(&self, u:VertexId) -> Range<usize>;

    /// degree of vertex u
    fn degree(&self, u:VertexId) -> usize { self.neighbors(u).len() }

    /// true iff u and v are adjacent
    fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool;

    /// edge list (u < v), edges()[e] is the edge of id e
    fn edges(&self) -> &[(VertexId, VertexId)];

    /// iterates over vertices
    fn vertices(&self) -> Range<VertexId> { 0..self.nb_vertices() }

    /// logs the instance statistics
    fn display_statistics(&self) {
        let degrees:Vec<usize> = self.vertices().map(|u| self.degree(u)).collect();
        tracing::info!(
            vertices = self.nb_vertices(),
            edges = self.nb_edges(),
            min_degree = degrees.iter().min().copied().unwrap_or(0),
            max_degree = degrees.iter().max().copied().unwrap_or(0),
            "instance statistics"
        );
    }
}


/// result of the solution checker
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CheckerResult {
    /// valid coloring using the given number of colors
    Ok(usize),
    /// the coloring does not assign a color to every vertex
    WrongLength(usize),
    /// the edge (u,v) has both endpoints with the same color
    Conflict(VertexId, VertexId),
}

/**
checks a coloring. Returns the number of colors (largest color + 1) if it is feasible.
*/
pub fn checker(inst:&dyn ColoringInstance, coloring:&[Color]) -> CheckerResult {
    if coloring.len() != inst.nb_vertices() {
        return CheckerResult::WrongLength(coloring.len());
    }
    for &(u,v) in inst.edges() {
        if coloring[u] == coloring[v] {
            return CheckerResult::Conflict(u,v);
        }
    }
    CheckerResult::Ok(nb_colors(coloring))
}

/// number of edges having both endpoints with the same color
pub fn count_conflicts(inst:&dyn ColoringInstance, coloring:&[Color]) -> usize {
    inst.edges().iter()
        .filter(|(u,v)| coloring[*u] == coloring[*v])
        .count()
}

/// number of colors of a coloring, seen as its largest color + 1 (0 if empty)
pub fn nb_colors(coloring:&[Color]) -> usize {
    coloring.iter().max().map_or(0, |c| c+1)
}

/// number of distinct colors actually used by a coloring
pub fn nb_used_colors(coloring:&[Color]) -> usize {
    let mut used = BitSet::with_capacity(coloring.len());
    for c in coloring { used.insert(*c); }
    used.len()
}

/// class_sizes[c]: number of vertices colored c, for c in [0,k)
pub fn class_sizes(coloring:&[Color], k:usize) -> Vec<usize> {
    let mut res = vec![0 ; k];
    for c in coloring {
        debug_assert!(*c < k);
        res[*c] += 1;
    }
    res
}

/// converts a coloring into a partition (empty classes removed)
pub fn color_classes(coloring:&[Color]) -> Solution {
    let mut sol:Solution = vec![vec![] ; nb_colors(coloring)];
    for (v,c) in coloring.iter().enumerate() {
        sol[*c].push(v);
    }
    sol.into_iter().filter(|e| !e.is_empty()).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact_instance::CompactInstance;

    fn square() -> CompactInstance {
        CompactInstance::from_edges(4, &[(0,1),(1,2),(2,3),(3,0)])
    }

    #[test]
    fn test_checker() {
        let inst = square();
        assert_eq!(checker(&inst, &[0,1,0,1]), CheckerResult::Ok(2));
        assert_eq!(checker(&inst, &[0,0,1,1]), CheckerResult::Conflict(0,1));
        assert_eq!(checker(&inst, &[0,1]), CheckerResult::WrongLength(2));
    }

    #[test]
    fn test_count_conflicts() {
        let inst = square();
        assert_eq!(count_conflicts(&inst, &[0,1,0,1]), 0);
        assert_eq!(count_conflicts(&inst, &[0,0,0,0]), 4);
        assert_eq!(count_conflicts(&inst, &[0,0,1,1]), 2);
    }

    #[test]
    fn test_colors() {
        assert_eq!(nb_colors(&[]), 0);
        assert_eq!(nb_colors(&[0,3,1]), 4);
        assert_eq!(nb_used_colors(&[0,3,1,3]), 3);
        assert_eq!(class_sizes(&[0,2,2,1,2], 4), vec![1,1,3,0]);
        assert_eq!(color_classes(&[2,0,2]), vec![vec![1], vec![0,2]]);
    }
}
