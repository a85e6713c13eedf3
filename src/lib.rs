//! Guided Local Search (GLS) for the Graph Coloring problem
//!
//! Minimizes the number of colors of a graph by solving the k-coloring problem
//! for a decreasing k: every epoch runs a guided local search (edge weights
//! penalizing persistent conflicts) from the previous solution reduced by one color.

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]

use std::rc::Rc;

/// coloring instance base trait, solutions and checker
pub mod color;

/// compact instance (adjacency arrays and edge identifiers)
pub mod compact_instance;

/// options of a run and their validation
pub mod config;

/// chromatic number upper bounds
pub mod upper_bound;

/// initial coloring builders
pub mod builder;

/// scores, moves and move orders
pub mod score;

/// addressable heap of moves
pub mod moves_queue;

/// search statistics and termination policy
pub mod report;

/// guided local search for a fixed k
pub mod gls;

/// epochs over a decreasing k
pub mod epoche;

use crate::color::{ColoringInstance, Coloring};
use crate::config::{Config, ConfigError};
use crate::epoche::EpocheRunner;

/** builds an initial coloring with the configured strategy and returns the best
coloring found by the epochs.
*/
pub fn solve(inst:Rc<dyn ColoringInstance>, config:&Config) -> Result<Coloring, ConfigError> {
    let mut runner = EpocheRunner::new(config)?;
    if config.debug_enabled(config::DEBUG_EPOCHE) {
        inst.display_statistics();
    }
    let initial = runner.build_initial(inst.as_ref());
    Ok(runner.solve(inst, &initial))
}
