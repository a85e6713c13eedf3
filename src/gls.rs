//! Guided Local Search for the k-coloring problem.
//!
//! See <http://www.cleveralgorithms.com/nature-inspired/stochastic/guided_local_search.html>.
//! Additions to the textbook algorithm:
//!  - incremental move evaluation through two addressable moves queues
//!  - aspiration moves
//!  - optional external reset of the weights
//!  - dynamic calibration of λ
//!  - execution timeout
//!  - fast search: a vertex can not go back to the color it left before one of its neighbors moves

use std::rc::Rc;
use std::time::Instant;

use bit_set::BitSet;
use fastrand::Rng;
use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::color::{Color, Coloring, ColoringInstance, VertexId};
use crate::config::{Config, ConfigError, DEBUG_EPOCHE, DEBUG_MINIMUM, DEBUG_MOVES};
use crate::moves_queue::MovesQueue;
use crate::report::{Resolution, SolveReport, Termination};
use crate::score::{self, ConflictOrder, DeltaScore, Move, Score, TotalOrder};

/// penalty of an edge
pub type Weight = u32;

/** Guided local search solving the k-coloring problem for a decreasing k.

[`GuidedLocalSearch::prepare`] allocates the per-edge weights and starts the clock,
then [`GuidedLocalSearch::solve`] can be called for every k (at most the prepared one).
*/
#[derive(Debug)]
pub struct GuidedLocalSearch {
    /// instance object
    inst: Rc<dyn ColoringInstance>,
    /// options of the run
    config: Config,
    /// limits of the search
    termination: Termination,
    /// number of colors of the current epoch
    k: usize,
    /// iterations since the solver was prepared
    iters: u64,
    /// moment the solver was prepared
    created: Instant,
    /// current coloring
    coloring: Coloring,
    /// score of the current coloring
    score: Score,
    /// best coloring of the epoch (fewest conflicts)
    solution: Coloring,
    /// score of the best coloring
    solution_score: Score,
    /// conflicts[v*k+c]: number of neighbors of v colored c
    conflicts: Vec<u32>,
    /// guidance[v*k+c]: total weight of the edges between v and neighbors colored c
    guidance: Vec<i64>,
    /// marked moves (v*k+c): c was left by v and no neighbor of v moved since (fast search)
    marked: BitSet,
    /// weights[e]: penalty of the edge e
    weights: Vec<Weight>,
    /// sum of the weights (the guidance is used iff it is positive)
    total_weight: u64,
    /// current guidance coefficient
    lambda: i64,
    /// λ was calibrated during the current epoch
    calibrated: bool,
    /// (sum of improvements, nb moves) before the first weight update
    lambda_samples: (i64, u64),
    /// consecutive moves without total score change
    plateau: u64,
    /// iterations since the last improvement of the best coloring
    no_improve: u64,
    /// moves ordered by total score delta
    total_queue: MovesQueue<TotalOrder>,
    /// moves ordered by conflicts delta (aspiration)
    conflict_queue: MovesQueue<ConflictOrder>,
    /// statistics of the current epoch
    epoch_report: SolveReport,
    /// statistics cumulated over the solved epochs
    solution_report: SolveReport,
}

impl GuidedLocalSearch {

    /// creates a solver for an instance
    pub fn new(inst:Rc<dyn ColoringInstance>, config:&Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(inst, config))
    }

    /// creates a solver from an already validated configuration
    pub(crate) fn with_valid_config(inst:Rc<dyn ColoringInstance>, config:&Config) -> Self {
        Self {
            inst,
            config: config.clone(),
            termination: Termination::new(config),
            k: 0,
            iters: 0,
            created: Instant::now(),
            coloring: Vec::new(),
            score: Score::default(),
            solution: Vec::new(),
            solution_score: Score::default(),
            conflicts: Vec::new(),
            guidance: Vec::new(),
            marked: BitSet::new(),
            weights: Vec::new(),
            total_weight: 0,
            lambda: config.lambda,
            calibrated: false,
            lambda_samples: (0,0),
            plateau: 0,
            no_improve: 0,
            total_queue: MovesQueue::default(),
            conflict_queue: MovesQueue::default(),
            epoch_report: SolveReport::default(),
            solution_report: SolveReport::default(),
        }
    }

    /** allocates the structures for at most k colors, clears the weights and starts the clock. */
    pub fn prepare(&mut self, k:usize) {
        let n = self.inst.nb_vertices();
        self.k = k;
        self.iters = 0;
        self.created = Instant::now();
        self.conflicts = Vec::with_capacity(n*k);
        self.guidance = Vec::with_capacity(n*k);
        self.weights = vec![0 ; self.inst.nb_edges()];
        self.total_weight = 0;
        self.solution_report = SolveReport::new(k);
    }

    /// statistics of the last epoch
    pub fn epoch_report(&self) -> &SolveReport { &self.epoch_report }

    /// statistics cumulated over the solved epochs
    pub fn solution_report(&self) -> &SolveReport { &self.solution_report }

    /// current edge weights
    pub fn weights(&self) -> &[Weight] { &self.weights }

    /// current guidance coefficient
    pub fn lambda(&self) -> i64 { self.lambda }

    /** searches a k-coloring without conflicts starting from the given coloring
    (colors must be in [0,k)). Returns the coloring with the fewest conflicts found.
    */
    pub fn solve(&mut self, coloring:&[Color], k:usize, rng:&mut Rng) -> Coloring {
        debug_assert!(coloring.iter().all(|c| *c < k));
        let epoch_start = Instant::now();
        self.epoch_report = SolveReport::new(k);
        if self.config.debug_enabled(DEBUG_MOVES) {
            trace!(iter = self.iters, k, "start");
        }
        self.build_structs(coloring, k);
        self.epoch_report.start = self.score;
        if self.iters == 0 {
            self.solution_report.start = self.score;
        }
        if self.score.conflicts == 0 {
            debug!(k, "skipped epoch: initial coloring has no conflict");
            self.epoch_report.skipped = true;
            self.finish_epoch(Resolution::Solved, epoch_start);
            return coloring.to_vec();
        }
        self.load_neighbors();
        let mut resolution = Resolution::NotFound;
        while !resolution.is_terminal() {
            self.iters += 1;
            self.epoch_report.iters += 1;
            if self.solution_score.conflicts == 0 {
                resolution = Resolution::Solved;
                break;
            }
            let (moves, aspired) = self.restrict_neighbours();
            if moves.is_empty() {
                resolution = Resolution::LocalMin;
                self.epoch_report.mins += 1;
                self.no_improve += 1;
            } else {
                if aspired { self.epoch_report.aspirations += 1; }
                let next = moves[rng.usize(0..moves.len())];
                self.plateau = if next.delta.total == 0 { self.plateau + 1 } else { 0 };
                if self.config.dynamic_lambda && self.total_weight == 0 {
                    self.lambda_samples.0 -= next.delta.total;
                    self.lambda_samples.1 += 1;
                }
                self.make_move(next);
                if self.score.conflicts < self.solution_score.conflicts {
                    self.solution.copy_from_slice(&self.coloring);
                    self.solution_score = self.score;
                    self.epoch_report.improvements += 1;
                    self.no_improve = 0;
                    if self.config.debug_enabled(DEBUG_MOVES) {
                        trace!(
                            iter = self.iters,
                            conflicts = self.solution_score.conflicts,
                            guidance = self.solution_score.guidance,
                            total = self.solution_score.total,
                            "improve"
                        );
                    }
                } else {
                    self.no_improve += 1;
                }
            }
            match self.termination.evaluate(self.iters, self.created.elapsed(), self.plateau, self.no_improve) {
                Some(Resolution::NoImprove) if resolution == Resolution::NotFound => {
                    resolution = Resolution::NoImprove;
                }
                Some(r) if r.is_terminal() => { resolution = r; }
                _ => {}
            }
            if resolution == Resolution::NoImprove || resolution == Resolution::LocalMin {
                if self.config.debug_enabled(DEBUG_MINIMUM) {
                    debug!(iter = self.iters, ?resolution, "weights update");
                }
                self.epoch_report.updates += 1;
                self.update_weights();
                self.plateau = 0;
                resolution = Resolution::NotFound;
            }
            if self.solution_score.conflicts == 0 {
                resolution = Resolution::Solved;
            }
        }
        self.finish_epoch(resolution, epoch_start);
        self.solution.clone()
    }

    /// closes the epoch report and updates the cumulated one
    fn finish_epoch(&mut self, resolution:Resolution, epoch_start:Instant) {
        self.epoch_report.end = self.solution_score;
        self.epoch_report.elapsed = epoch_start.elapsed();
        self.epoch_report.resolution = Some(resolution);
        if self.config.debug_enabled(DEBUG_EPOCHE) {
            self.epoch_report.print("epoch");
        }
        if resolution == Resolution::Solved {
            self.solution_report.accumulate(&self.epoch_report);
            self.solution_report.k = self.k;
            self.solution_report.end = Score::default();
        } else {
            self.solution_report.end = self.score;
        }
        self.solution_report.resolution = Some(resolution);
        self.solution_report.elapsed = self.created.elapsed();
        debug!(k = self.k, ?resolution, iters = self.epoch_report.iters, "epoch finished");
    }

    /// guidance coefficient if the guidance is in use
    fn active_lambda(&self) -> Option<i64> {
        if self.total_weight > 0 { Some(self.lambda) } else { None }
    }

    /** builds the conflicts and guidance tables and the score of a coloring (O(n+m)) */
    fn build_structs(&mut self, coloring:&[Color], k:usize) {
        let inst = Rc::clone(&self.inst);
        let n = inst.nb_vertices();
        self.k = k;
        self.coloring = coloring.to_vec();
        self.conflicts.clear();
        self.conflicts.resize(n*k, 0);
        self.guidance.clear();
        self.guidance.resize(n*k, 0);
        self.marked.clear();
        if self.config.reset_weights {
            self.weights.fill(0);
            self.total_weight = 0;
        }
        let mut conflicts = 0;
        let mut guidance = 0;
        for v in inst.vertices() {
            for (u,e) in inst.neighbors(v).iter().zip(inst.incident_edges(v)) {
                let slot = v*k + self.coloring[*u];
                self.conflicts[slot] += 1;
                self.guidance[slot] += self.weights[*e] as i64;
            }
            conflicts += self.conflicts[v*k + self.coloring[v]] as i64;
            guidance += self.guidance[v*k + self.coloring[v]];
        }
        self.lambda = self.config.lambda;
        self.calibrated = false;
        self.lambda_samples = (0,0);
        self.plateau = 0;
        self.no_improve = 0;
        self.score = Score::new(conflicts / 2, guidance / 2, self.active_lambda());
        self.solution = self.coloring.clone();
        self.solution_score = self.score;
    }

    /// score change when coloring v with c
    fn delta(&self, v:VertexId, c:Color) -> DeltaScore {
        let current = self.coloring[v];
        if c == current { return DeltaScore::default(); }
        let row = v * self.k;
        let conflicts = self.conflicts[row+c] as i64 - self.conflicts[row+current] as i64;
        let guidance = self.guidance[row+c] - self.guidance[row+current];
        DeltaScore { conflicts, guidance, total: score::total(conflicts, guidance, self.active_lambda()) }
    }

    /// evaluates every move and loads them in the queues
    fn load_neighbors(&mut self) {
        if !self.config.moves_queue { return; }
        let n = self.inst.nb_vertices();
        let mut moves = Vec::with_capacity(n * self.k);
        for v in 0..n {
            for c in 0..self.k {
                moves.push(Move { node: v, to: c, delta: self.delta(v, c) });
            }
        }
        if self.config.aspiration {
            self.conflict_queue.build(moves.clone(), self.k);
        }
        self.total_queue.build(moves, self.k);
    }

    /// re-evaluates the moves of v in the queues
    fn refresh_node(&mut self, v:VertexId) {
        if !self.config.moves_queue { return; }
        for c in 0..self.k {
            let m = Move { node: v, to: c, delta: self.delta(v, c) };
            self.total_queue.change(m);
            if self.config.aspiration {
                self.conflict_queue.change(m);
            }
        }
    }

    /** returns the candidate moves and whether they are aspiration moves.
    Aspiration moves reach fewer conflicts than the best coloring while increasing
    the total score. Otherwise, candidates are the best non-worsening moves.
    Marked moves are never candidates. An empty result is a local minimum.
    */
    fn restrict_neighbours(&self) -> (Vec<Move>, bool) {
        if !self.config.moves_queue {
            return self.scan_neighbours();
        }
        let capacity = self.config.head_capacity;
        if self.config.aspiration {
            let aspired = self.conflict_queue.head(
                &self.coloring, &self.conflicts, &self.marked, capacity, |m| self.is_aspiration(m)
            );
            if !aspired.is_empty() { return (aspired, true); }
        }
        let head = self.total_queue.head(&self.coloring, &self.conflicts, &self.marked, capacity, |_| true);
        let non_worsening = head.first().map_or(false, |m| m.delta.total <= 0);
        if non_worsening { (head, false) } else { (Vec::new(), false) }
    }

    /// same as restrict_neighbours, evaluating every move of a conflicting vertex
    fn scan_neighbours(&self) -> (Vec<Move>, bool) {
        let mut result = Vec::new();
        let mut aspired = Vec::new();
        let mut best_total = 0;
        let mut min_conflicts = i64::MAX;
        for v in self.inst.vertices() {
            let current = self.coloring[v];
            if self.conflicts[v*self.k + current] == 0 { continue; }
            for c in 0..self.k {
                if c == current || self.marked.contains(v*self.k + c) { continue; }
                let m = Move { node: v, to: c, delta: self.delta(v, c) };
                if m.delta.total < best_total {
                    best_total = m.delta.total;
                    result.clear();
                }
                if m.delta.total == best_total {
                    result.push(m);
                }
                if self.config.aspiration {
                    if m.delta.conflicts < min_conflicts {
                        min_conflicts = m.delta.conflicts;
                        aspired.clear();
                    }
                    if m.delta.conflicts == min_conflicts && self.is_aspiration(&m) {
                        aspired.push(m);
                    }
                }
            }
        }
        if aspired.is_empty() { (result, false) } else { (aspired, true) }
    }

    #[inline]
    fn is_aspiration(&self, m:&Move) -> bool {
        self.score.conflicts + m.delta.conflicts < self.solution_score.conflicts && m.delta.total > 0
    }

    /** applies a move to the current coloring and updates the tables and the queues */
    fn make_move(&mut self, next:Move) {
        let inst = Rc::clone(&self.inst);
        let k = self.k;
        let v = next.node;
        let previous = self.coloring[v];
        let delta = self.delta(v, next.to);
        for (u,e) in inst.neighbors(v).iter().zip(inst.incident_edges(v)) {
            let w = self.weights[*e] as i64;
            debug_assert!(self.conflicts[u*k + previous] > 0);
            self.conflicts[u*k + previous] -= 1;
            self.conflicts[u*k + next.to] += 1;
            self.guidance[u*k + previous] -= w;
            self.guidance[u*k + next.to] += w;
            if self.config.fast_search {
                for c in 0..k { self.marked.remove(u*k + c); }
            }
        }
        if self.config.fast_search {
            self.marked.insert(v*k + previous);
        }
        self.coloring[v] = next.to;
        self.score = self.score.apply(&delta);
        self.refresh_node(v);
        for u in inst.neighbors(v) {
            self.refresh_node(*u);
        }
        if self.config.debug_enabled(DEBUG_MOVES) {
            trace!(
                iter = self.iters, node = v, to = next.to,
                conflicts = self.score.conflicts, guidance = self.score.guidance, total = self.score.total,
                "move"
            );
        }
    }

    /** increments the weight of the conflicting edges of maximum utility 1/(1+w) */
    fn update_weights(&mut self) {
        let inst = Rc::clone(&self.inst);
        let k = self.k;
        let mut max_utility = OrderedFloat(0.);
        let mut updates = Vec::new();
        for (e,(u,v)) in inst.edges().iter().enumerate() {
            if self.coloring[*u] != self.coloring[*v] { continue; }
            let utility = OrderedFloat(1. / (1. + self.weights[e] as f64));
            if utility > max_utility {
                max_utility = utility;
                updates.clear();
            }
            if utility == max_utility {
                updates.push(e);
            }
        }
        if updates.is_empty() { return; }
        let was_in_use = self.total_weight > 0;
        let mut affected = BitSet::with_capacity(inst.nb_vertices());
        for e in &updates {
            let (u,v) = inst.edges()[*e];
            let c = self.coloring[u];
            self.weights[*e] += 1;
            self.guidance[u*k + c] += 1;
            self.guidance[v*k + c] += 1;
            affected.insert(u);
            affected.insert(v);
        }
        self.total_weight += updates.len() as u64;
        let mut reload = !was_in_use;
        if self.config.dynamic_lambda && !self.calibrated {
            let (sum, nb) = self.lambda_samples;
            let average = if nb > 0 { sum / nb as i64 } else { 0 };
            self.lambda = average.max(1);
            self.calibrated = true;
            reload = true;
            debug!(lambda = self.lambda, "lambda calibrated");
        }
        self.score = Score::new(
            self.score.conflicts,
            self.score.guidance + updates.len() as i64,
            self.active_lambda()
        );
        if reload {
            self.load_neighbors();
        } else {
            for u in affected.iter() {
                self.refresh_node(u);
            }
        }
    }

    /// recomputes every structure from scratch and compares (used by the tests)
    #[cfg(test)]
    fn check_structs(&self) -> bool {
        let inst = &self.inst;
        let k = self.k;
        let mut conflicts = vec![0 ; inst.nb_vertices() * k];
        let mut guidance = vec![0 ; inst.nb_vertices() * k];
        for v in inst.vertices() {
            for (u,e) in inst.neighbors(v).iter().zip(inst.incident_edges(v)) {
                conflicts[v*k + self.coloring[*u]] += 1;
                guidance[v*k + self.coloring[*u]] += self.weights[*e] as i64;
            }
        }
        let nb_conflicts = crate::color::count_conflicts(inst.as_ref(), &self.coloring) as i64;
        let total_guidance:i64 = inst.edges().iter().enumerate()
            .filter(|(_,(u,v))| self.coloring[*u] == self.coloring[*v])
            .map(|(e,_)| self.weights[e] as i64)
            .sum();
        let mut ok = conflicts == self.conflicts
            && guidance == self.guidance
            && self.score == Score::new(nb_conflicts, total_guidance, self.active_lambda())
            && self.total_weight == self.weights.iter().map(|w| *w as u64).sum::<u64>();
        if self.config.moves_queue {
            ok &= self.total_queue.is_valid();
            for v in inst.vertices() {
                for c in 0..k {
                    let expected = Move { node: v, to: c, delta: self.delta(v, c) };
                    ok &= *self.total_queue.get(v, c) == expected;
                    if self.config.aspiration {
                        ok &= *self.conflict_queue.get(v, c) == expected;
                    }
                }
            }
            if self.config.aspiration { ok &= self.conflict_queue.is_valid(); }
        }
        ok
    }
}
