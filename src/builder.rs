use std::cmp::Ordering;

use bit_set::BitSet;
use fastrand::Rng;
use priority_queue::PriorityQueue;

use crate::color::{Color, Coloring, ColoringInstance, VertexId};
use crate::config::{BuildStrategy, Config, ConfigError};
use crate::upper_bound::ColoringUpperBound;

/** Initial coloring builder.
Supported methods: greedy, bipartite, random, DSATUR
*/
#[derive(Debug, Clone)]
pub struct ColoringBuilder {
    strategy: BuildStrategy,
    bound: ColoringUpperBound,
}

impl ColoringBuilder {
    /// creates a builder from a (valid) configuration
    pub fn new(config:&Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            strategy: config.build_strategy,
            bound: ColoringUpperBound::new(config.upper_bound),
        })
    }

    /// builds a coloring with the configured strategy
    pub fn build(&self, inst:&dyn ColoringInstance, rng:&mut Rng) -> Coloring {
        match self.strategy {
            BuildStrategy::RandomStart => Self::random(inst, self.bound.calculate(inst), rng),
            BuildStrategy::Greedy => Self::greedy(inst),
            BuildStrategy::Bipartite => Self::bipartite(inst),
            BuildStrategy::Dsatur => Self::dsatur(inst),
        }
    }

    /// random coloring using colors in [0,k)
    pub fn random(inst:&dyn ColoringInstance, k:usize, rng:&mut Rng) -> Coloring {
        debug_assert!(k > 0);
        inst.vertices().map(|_| rng.usize(0..k)).collect()
    }

    /** 2-coloring obtained by a DFS (explicit stack) alternating the colors.
    Contains conflicts iff the graph is not bipartite.
    */
    pub fn bipartite(inst:&dyn ColoringInstance) -> Coloring {
        let n = inst.nb_vertices();
        let mut labels:Vec<Option<Color>> = vec![None ; n];
        let mut stack:Vec<(VertexId, Color)> = Vec::new();
        for s in inst.vertices() {
            if labels[s].is_some() { continue; }
            stack.push((s, 0));
            while let Some((u,c)) = stack.pop() {
                if labels[u].is_some() { continue; }
                labels[u] = Some(c);
                for v in inst.neighbors(u) {
                    if labels[*v].is_none() {
                        stack.push((*v, 1-c));
                    }
                }
            }
        }
        labels.into_iter().map(|c| c.unwrap_or(0)).collect()
    }

    /** first-fit coloring in the vertex order: each vertex gets the smallest color
    not used by its already colored neighbors. Never creates conflicts, may use
    more colors than any given target.
    */
    pub fn greedy(inst:&dyn ColoringInstance) -> Coloring {
        let n = inst.nb_vertices();
        let mut colors:Vec<Option<Color>> = vec![None ; n];
        let mut unavailable = BitSet::with_capacity(n);
        for v in inst.vertices() {
            for u in inst.neighbors(v) {
                if let Some(c) = colors[*u] { unavailable.insert(c); }
            }
            let mut c = 0;
            while unavailable.contains(c) { c += 1; }
            colors[v] = Some(c);
            for u in inst.neighbors(v) {
                if let Some(c) = colors[*u] { unavailable.remove(c); }
            }
        }
        colors.into_iter().map(|c| c.unwrap_or(0)).collect()
    }

    /** DSATUR greedy:
        1. choose an uncolored vertex that sees the most colors (break ties by the largest degree)
        2. give it the first color available
        3. mark all its neighbors seeing this color
        4. repeat until every vertex is colored
    */
    pub fn dsatur(inst:&dyn ColoringInstance) -> Coloring {
        let n = inst.nb_vertices();
        let mut remaining:PriorityQueue<VertexId, DSatInfo> = PriorityQueue::new();
        for u in inst.vertices() {
            remaining.push(u, DSatInfo { dsat:0, degree:inst.degree(u) });
        }
        let mut colors:Vec<Option<Color>> = vec![None ; n];
        let mut adj_colors:Vec<BitSet> = vec![BitSet::default() ; n]; // colors seen by each vertex
        while let Some((u,_)) = remaining.pop() {
            let mut color = 0;
            while adj_colors[u].contains(color) { color += 1; }
            colors[u] = Some(color);
            // update saturation degrees
            for v in inst.neighbors(u) {
                if colors[*v].is_none() && !adj_colors[*v].contains(color) {
                    adj_colors[*v].insert(color);
                    remaining.change_priority_by(v, |p| { p.dsat += 1; });
                }
            }
        }
        colors.into_iter().map(|c| c.unwrap_or(0)).collect()
    }
}


#[derive(Debug, PartialEq, Eq)]
struct DSatInfo {
    dsat: usize,
    degree: usize,
}

impl Ord for DSatInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dsat.cmp(&other.dsat)
            .then_with(|| self.degree.cmp(&other.degree))
    }
}

impl PartialOrd for DSatInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
