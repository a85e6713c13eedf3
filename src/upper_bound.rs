//! Upper bounds of the chromatic number computed from degree sequences.
//!
//! Based on <http://www.sciencedirect.com/science/article/pii/S0166218X11003039>.

use crate::color::{ColoringInstance, VertexId};
use crate::config::UpperBoundMethod;

/** estimates a number of colors that is always sufficient */
#[derive(Debug, Clone, Copy)]
pub struct ColoringUpperBound {
    method: UpperBoundMethod,
}

impl ColoringUpperBound {
    /// creates an estimator using the given method
    pub fn new(method:UpperBoundMethod) -> Self { Self { method } }

    /// computes the bound with the configured method
    pub fn calculate(&self, inst:&dyn ColoringInstance) -> usize {
        match self.method {
            UpperBoundMethod::Simple => Self::simple(inst),
            UpperBoundMethod::Theorem2 => Self::theorem2(inst),
            UpperBoundMethod::Theorem3 => Self::theorem3(inst),
        }
    }

    /// (vertex, degree) sorted by decreasing degree, ties by vertex index
    fn sorted_degrees(inst:&dyn ColoringInstance) -> Vec<(VertexId, usize)> {
        let mut res:Vec<(VertexId, usize)> = inst.vertices().map(|u| (u, inst.degree(u))).collect();
        res.sort_by(|a,b| b.1.cmp(&a.1)); // stable
        res
    }

    /// number of leading values d[i] >= i in a non-increasing sequence (at least 1)
    fn scan(sorted:&[(VertexId, usize)]) -> usize {
        let mut res = 0;
        for (_,d) in sorted {
            if *d >= res { res += 1; } else { break; }
        }
        res.max(1)
    }

    /// Brooks' theorem: Δ(G) + 1
    pub fn simple(inst:&dyn ColoringInstance) -> usize {
        inst.vertices().map(|u| inst.degree(u)).max().unwrap_or(0) + 1
    }

    /// Theorem 2: max i such that the i-th largest degree is at least i-1
    pub fn theorem2(inst:&dyn ColoringInstance) -> usize {
        Self::scan(&Self::sorted_degrees(inst))
    }

    /// Theorem 3: Theorem 2 applied to the rho values
    /// (rho(v): number of leading neighbor degrees d with d > rho)
    pub fn theorem3(inst:&dyn ColoringInstance) -> usize {
        let mut rhos:Vec<(VertexId, usize)> = Vec::with_capacity(inst.nb_vertices());
        for v in inst.vertices() {
            let mut tab:Vec<usize> = inst.neighbors(v).iter().map(|u| inst.degree(*u)).collect();
            tab.sort_by(|a,b| b.cmp(a));
            let mut rho = 0;
            for d in tab {
                if d > rho { rho += 1; } else { break; }
            }
            rhos.push((v, rho));
        }
        rhos.sort_by(|a,b| b.1.cmp(&a.1));
        Self::scan(&rhos)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact_instance::CompactInstance;

    fn all(inst:&dyn ColoringInstance) -> [usize ; 3] {
        [
            ColoringUpperBound::simple(inst),
            ColoringUpperBound::theorem2(inst),
            ColoringUpperBound::theorem3(inst),
        ]
    }

    #[test]
    fn test_complete_graph() {
        let inst = CompactInstance::complete(4);
        for b in all(&inst) { assert!(b >= 4); }
        assert_eq!(all(&inst), [4,4,4]);
    }

    #[test]
    fn test_star() {
        // star with 5 leaves: Brooks says 6, degree sequences say 2
        let inst = CompactInstance::from_edges(6, &[(0,1),(0,2),(0,3),(0,4),(0,5)]);
        assert_eq!(ColoringUpperBound::simple(&inst), 6);
        assert_eq!(ColoringUpperBound::theorem2(&inst), 2);
        assert_eq!(ColoringUpperBound::theorem3(&inst), 2);
    }

    #[test]
    fn test_empty_graph() {
        let inst = CompactInstance::from_edges(3, &[]);
        assert_eq!(all(&inst), [1,1,1]);
        let inst = CompactInstance::from_edges(0, &[]);
        assert_eq!(all(&inst), [1,1,1]);
    }

    #[test]
    fn test_calculate_dispatch() {
        let inst = CompactInstance::cycle(5);
        assert_eq!(ColoringUpperBound::new(UpperBoundMethod::Simple).calculate(&inst), 3);
        assert_eq!(ColoringUpperBound::new(UpperBoundMethod::Theorem2).calculate(&inst), 3);
        assert_eq!(ColoringUpperBound::new(UpperBoundMethod::Theorem3).calculate(&inst), 3);
    }
}
