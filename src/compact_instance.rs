use std::ops::Range;

use bit_set::BitSet;

use crate::color::{ColoringInstance, EdgeId, VertexId};

/** models a Graph Coloring instance (compressed adjacency arrays).

first[u]..first[u+1] are the slots of u: targets[slot] is a neighbor of u and
edge_ids[slot] the canonical id of the corresponding edge.
*/
#[derive(Debug, Clone)]
pub struct CompactInstance {
    /// nb vertices
    n: usize,
    /// first[u]: first slot of u (size n+1)
    first: Vec<usize>,
    /// targets[slot]: neighbor stored in the slot
    targets: Vec<VertexId>,
    /// edge_ids[slot]: edge id stored in the slot
    edge_ids: Vec<EdgeId>,
    /// edges of the graph (u < v)
    edges: Vec<(VertexId,VertexId)>,
    /// if exists: adj_matrix[i] represents a bitset of its neighbors
    adj_matrix: Option<Vec<BitSet>>,
}

impl ColoringInstance for CompactInstance {
    fn nb_vertices(&self) -> usize { self.n }

    fn nb_edges(&self) -> usize { self.edges.len() }

    fn neighbors(&self, u:VertexId) -> &[VertexId] { &self.targets[self.edge_range(u)] }

    fn incident_edges(&self, u:VertexId) -> &[EdgeId] { &self.edge_ids[self.edge_range(u)] }

    fn edge_range(&self, u:VertexId) -> Range<usize> { self.first[u]..self.first[u+1] }

    fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool {
        match &self.adj_matrix { // if the matrix representation does not exist, iterate over
            None => { self.neighbors(u).iter().any(|c| &v==c) },
            Some(matrix) => { matrix[u].contains(v) } // otherwise, use it
        }
    }

    fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }
}


impl CompactInstance {

    /** constructor using an adjacency list (adj_list[u] contains v iff adj_list[v] contains u).
    Self-loops are ignored. */
    pub fn new(adj_list:Vec<Vec<VertexId>>) -> Self {
        let adj_list:Vec<Vec<VertexId>> = adj_list.into_iter().enumerate()
            .map(|(u,l)| l.into_iter().filter(|v| *v != u).collect())
            .collect();
        let n = adj_list.len();
        let mut first = Vec::with_capacity(n+1);
        let mut targets = Vec::new();
        first.push(0);
        for l in &adj_list {
            targets.extend_from_slice(l);
            first.push(targets.len());
        }
        // edges are numbered when seen from their smallest endpoint
        let mut edges = Vec::with_capacity(targets.len()/2);
        let mut edge_ids = vec![0 ; targets.len()];
        for (u,l) in adj_list.iter().enumerate() {
            for (i,v) in l.iter().enumerate() {
                if u < *v {
                    edge_ids[first[u]+i] = edges.len();
                    edges.push((u,*v));
                }
            }
        }
        // the reverse slot (v -> u) gets the id of (u,v)
        for (u,l) in adj_list.iter().enumerate() {
            for (i,v) in l.iter().enumerate() {
                if u > *v {
                    let pos = adj_list[*v].iter().position(|w| *w == u)
                        .unwrap_or_else(|| panic!("asymmetric adjacency: {} -> {}", u, v));
                    edge_ids[first[u]+i] = edge_ids[first[*v]+pos];
                }
            }
        }
        Self { n, first, targets, edge_ids, edges, adj_matrix:None }
    }

    /** constructor using an edge list. Self-loops and duplicated edges are ignored. */
    pub fn from_edges(n:usize, edges:&[(VertexId,VertexId)]) -> Self {
        let mut seen:Vec<BitSet> = vec![BitSet::default() ; n];
        let mut adj_list = vec![Vec::new() ; n];
        for &(u,v) in edges {
            if u == v || seen[u].contains(v) { continue; }
            seen[u].insert(v);
            seen[v].insert(u);
            adj_list[u].push(v);
            adj_list[v].push(u);
        }
        Self::new(adj_list)
    }

    /// complete graph on n vertices
    pub fn complete(n:usize) -> Self {
        let edges:Vec<(VertexId,VertexId)> = (0..n)
            .flat_map(|u| (u+1..n).map(move |v| (u,v)))
            .collect();
        Self::from_edges(n, &edges)
    }

    /// cycle on n vertices
    pub fn cycle(n:usize) -> Self {
        let edges:Vec<(VertexId,VertexId)> = (0..n).map(|u| (u, (u+1)%n)).collect();
        Self::from_edges(n, &edges)
    }

    /// if called, populate the adj_matrix
    pub fn populate_adj_matrix(&mut self) {
        let mut res = vec![BitSet::default(); self.n];
        for (a,resa) in res.iter_mut().enumerate() {
            for b in &self.targets[self.first[a]..self.first[a+1]] {
                resa.insert(*b);
            }
        }
        self.adj_matrix = Some(res);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_instance() {
        let inst = CompactInstance::from_edges(4, &[(0,1),(1,2),(2,3),(3,0),(1,0),(2,2)]);
        assert_eq!(inst.nb_vertices(), 4);
        assert_eq!(inst.nb_edges(), 4);
        assert_eq!(inst.neighbors(0), &[1,3]);
        assert_eq!(inst.degree(2), 2);
        assert_eq!(inst.edge_range(1), 2..4);
    }

    #[test]
    fn test_edge_ids_are_shared() {
        let inst = CompactInstance::complete(5);
        assert_eq!(inst.nb_edges(), 10);
        for u in inst.vertices() {
            for (v,e) in inst.neighbors(u).iter().zip(inst.incident_edges(u)) {
                let (a,b) = inst.edges()[*e];
                assert_eq!((a,b), (u.min(*v), u.max(*v)));
            }
        }
    }

    #[test]
    fn test_self_loops_are_ignored() {
        let inst = CompactInstance::new(vec![vec![0,1], vec![0]]);
        assert_eq!(inst.nb_edges(), 1);
        assert_eq!(inst.neighbors(0), &[1]);
        assert_eq!(inst.incident_edges(0), &[0]);
        assert_eq!(inst.incident_edges(1), &[0]);
        assert_eq!(crate::color::count_conflicts(&inst, &[0,1]), 0);
    }

    #[test]
    fn test_adjacency() {
        let mut inst = CompactInstance::cycle(5);
        assert!(inst.are_adjacent(0,4));
        assert!(!inst.are_adjacent(0,2));
        inst.populate_adj_matrix();
        assert!(inst.are_adjacent(4,0));
        assert!(!inst.are_adjacent(2,0));
    }
}
