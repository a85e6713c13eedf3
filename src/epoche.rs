//! Epoch controller: solves the k-coloring problem for a decreasing k.
//!
//! Every accepted k-coloring is reduced to a (k-1)-coloring (by a merge of two
//! color classes or a random restart) which becomes the starting point of the
//! next epoch. The last conflict-free coloring is returned.

use std::rc::Rc;

use fastrand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::ColoringBuilder;
use crate::color::{class_sizes, count_conflicts, nb_colors, nb_used_colors, Color, Coloring, ColoringInstance};
use crate::config::{Config, ConfigError, EpocheStrategy, EpocheTarget, DEBUG_OUTPUT, DEBUG_SOLUTION};
use crate::gls::GuidedLocalSearch;
use crate::report::SolveReport;
use crate::upper_bound::ColoringUpperBound;

/// smallest number of colors tried by the epochs (2-colorings are found by the bipartite builder)
const MIN_EPOCH_COLORS:usize = 3;

/** Result of a run of the epoch controller. */
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// best coloring found
    pub coloring: Coloring,
    /// number of colors of the coloring
    pub nb_colors: usize,
    /// true iff the instance was solved by the bipartite builder
    pub bipartite: bool,
    /// statistics of every epoch, by decreasing k
    pub epochs: Vec<SolveReport>,
    /// statistics cumulated over the solved epochs
    pub solution: SolveReport,
}


/** Drives the guided local search over decreasing k. Owns the random number
generator of the run: builder, epochs and merges all draw from it.
*/
#[derive(Debug)]
pub struct EpocheRunner {
    config: Config,
    builder: ColoringBuilder,
    bound: ColoringUpperBound,
    rng: Rng,
}

impl EpocheRunner {
    /// creates a runner from a configuration
    pub fn new(config:&Config) -> Result<Self, ConfigError> {
        Ok(Self {
            builder: ColoringBuilder::new(config)?,
            bound: ColoringUpperBound::new(config.upper_bound),
            rng: Rng::with_seed(config.seed),
            config: config.clone(),
        })
    }

    /// builds an initial coloring with the configured strategy
    pub fn build_initial(&mut self, inst:&dyn ColoringInstance) -> Coloring {
        self.builder.build(inst, &mut self.rng)
    }

    /// best coloring found from the given one
    pub fn solve(&mut self, inst:Rc<dyn ColoringInstance>, coloring:&[Color]) -> Coloring {
        self.run(inst, coloring).coloring
    }

    /** runs the epochs from the given coloring (one color per vertex, possibly with conflicts).

    1. if the bipartite builder finds no conflict, its coloring is returned
    2. K = max(upper bound, colors used by the input), input colors ≥ K are replaced by 0
    3. for k = K down to max(lower bound, 3): solve the k-coloring problem,
       stop at the first failure, otherwise reduce the solution to k-1 colors
    */
    pub fn run(&mut self, inst:Rc<dyn ColoringInstance>, coloring:&[Color]) -> RunOutcome {
        assert_eq!(coloring.len(), inst.nb_vertices(), "one color per vertex expected");
        let two_coloring = ColoringBuilder::bipartite(inst.as_ref());
        if count_conflicts(inst.as_ref(), &two_coloring) == 0 {
            debug!(colors = nb_colors(&two_coloring), "bipartite instance");
            return self.outcome(two_coloring, true, Vec::new(), SolveReport::default());
        }
        let k_max = self.bound.calculate(inst.as_ref()).max(nb_used_colors(coloring));
        let lower = self.config.lower_bound.max(MIN_EPOCH_COLORS);
        debug!(k_max, lower, "epochs");
        let mut result:Coloring = coloring.iter()
            .map(|c| if *c >= k_max { 0 } else { *c })
            .collect();
        let mut filtered = result.clone();
        let mut solver = GuidedLocalSearch::with_valid_config(inst.clone(), &self.config);
        solver.prepare(k_max);
        let mut epochs = Vec::new();
        let mut k = k_max;
        while k >= lower {
            let solution = solver.solve(&filtered, k, &mut self.rng);
            epochs.push(solver.epoch_report().clone());
            if count_conflicts(inst.as_ref(), &solution) > 0 {
                debug!(k, "no conflict-free coloring found");
                break;
            }
            debug!(k, "conflict-free coloring found");
            filtered = self.filter(inst.as_ref(), &solution, k);
            result = solution;
            k -= 1;
        }
        let solution = solver.solution_report().clone();
        if self.config.debug_enabled(DEBUG_SOLUTION) {
            solution.print("solution");
        }
        self.outcome(result, false, epochs, solution)
    }

    /** reduces a conflict-free k-coloring to a (k-1)-coloring (possibly with conflicts).
    A coloring already using at most k-1 colors without conflict is returned unchanged.
    */
    pub fn filter(&mut self, inst:&dyn ColoringInstance, coloring:&[Color], k:usize) -> Coloring {
        if k <= 1 || (nb_colors(coloring) < k && count_conflicts(inst, coloring) == 0) {
            return coloring.to_vec();
        }
        if self.config.update_strategy == EpocheStrategy::Scratch {
            return ColoringBuilder::random(inst, k-1, &mut self.rng);
        }
        let ranking = groups(coloring, k);
        let source = pick(self.config.source_target, &ranking, &mut self.rng);
        match destination_index(self.config.destination_target, self.config.source_target, k) {
            None => {
                let rng = &mut self.rng;
                coloring.iter().map(|c| {
                    let mut c = *c;
                    if c == source {
                        c = rng.usize(0..k-1);
                        if c >= source { c += 1; }
                    }
                    shift(c, source)
                }).collect()
            }
            Some(i) => {
                // a randomly picked source may occupy the slot: take the next one
                let i = if ranking[i] != source { i } else if i+1 < k { i+1 } else { i-1 };
                merge(coloring, source, ranking[i])
            }
        }
    }

    fn outcome(&self, coloring:Coloring, bipartite:bool, epochs:Vec<SolveReport>, solution:SolveReport) -> RunOutcome {
        if self.config.debug_enabled(DEBUG_OUTPUT) {
            info!(coloring = ?coloring, "best coloring");
        }
        RunOutcome { nb_colors: nb_colors(&coloring), coloring, bipartite, epochs, solution }
    }
}


/// colors of [0,k) sorted by decreasing class size (ties: smallest color first)
fn groups(coloring:&[Color], k:usize) -> Vec<Color> {
    let sizes = class_sizes(coloring, k);
    let mut ranking:Vec<Color> = (0..k).collect();
    ranking.sort_by(|a,b| sizes[*b].cmp(&sizes[*a]));
    ranking
}

/// selects a color from a non-empty ranking
fn pick(target:EpocheTarget, ranking:&[Color], rng:&mut Rng) -> Color {
    match target {
        EpocheTarget::Random => ranking[rng.usize(0..ranking.len())],
        EpocheTarget::Minimal => ranking[ranking.len()-1],
        EpocheTarget::Maximal => ranking[0],
        EpocheTarget::Median => ranking[ranking.len()/2],
    }
}

/** position of the merge destination in the ranking (None: a random color per vertex).
The slot of a source selected by the same target is skipped.
*/
fn destination_index(target:EpocheTarget, source_target:EpocheTarget, k:usize) -> Option<usize> {
    let same = target == source_target;
    match target {
        EpocheTarget::Random => None,
        EpocheTarget::Minimal => Some(if same { k-2 } else { k-1 }),
        EpocheTarget::Maximal => Some(if same { 1 } else { 0 }),
        EpocheTarget::Median => Some(if same { k/2 - 1 } else { k/2 }),
    }
}

/// renumbers the colors above the removed one
#[inline]
fn shift(c:Color, removed:Color) -> Color {
    if c > removed { c-1 } else { c }
}

/// recolors the class source with destination and removes the color source
fn merge(coloring:&[Color], source:Color, destination:Color) -> Coloring {
    coloring.iter()
        .map(|c| shift(if *c == source { destination } else { *c }, source))
        .collect()
}
