use serde::{Deserialize, Serialize};
use thiserror::Error;

/** How to build an initial coloring */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BuildStrategy {
    /// random coloring using the chromatic upper bound as number of colors (may have conflicts)
    RandomStart,
    /// first-fit in vertex order (no conflicts)
    Greedy,
    /// 2-coloring by a DFS (conflicts if the graph is not bipartite)
    Bipartite,
    /// DSATUR greedy (no conflicts)
    Dsatur,
}

/** What to do between two epochs (going from k to k-1 colors) */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum EpocheStrategy {
    /// build a new random coloring with k-1 colors
    Scratch,
    /// merge one color class into another
    Merge,
}

/** Which color class to select as merge source or destination */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum EpocheTarget {
    /// random color
    Random,
    /// color with the fewest vertices
    Minimal,
    /// color with the most vertices
    Maximal,
    /// color with the median number of vertices
    Median,
}

/** Method estimating an upper bound of the chromatic number
(see <http://www.sciencedirect.com/science/article/pii/S0166218X11003039>) */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum UpperBoundMethod {
    /// Brooks: max degree + 1
    Simple,
    /// Theorem 2 of the referenced work
    Theorem2,
    /// Theorem 3 of the referenced work
    Theorem3,
}

/// log the best coloring found
pub const DEBUG_OUTPUT:u32 = 1;
/// log the start and end attributes of every epoch
pub const DEBUG_EPOCHE:u32 = 2;
/// log the cumulative attributes of the solution process
pub const DEBUG_SOLUTION:u32 = 4;
/// log every weight update
pub const DEBUG_MINIMUM:u32 = 8;
/// log every applied move
pub const DEBUG_MOVES:u32 = 16;


/// invalid combination of options
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    /// Scratch epochs build random colorings
    #[error("scratch epoch strategy is supported only with a random start")]
    ScratchRequiresRandomStart,

    /// dynamic lambda is calibrated on fresh weights
    #[error("dynamic lambda and weight keeping can not be applied together")]
    DynamicLambdaWithKeptWeights,

    /// the queue heads would always be empty
    #[error("the moves queue head capacity must be positive")]
    ZeroHeadCapacity,

    /// the guidance can not reward conflicts
    #[error("lambda must be non-negative (got {0})")]
    NegativeLambda(i64),
}


/** Configuration of a run, built once and shared by every component. */
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// how to build the initial coloring
    pub build_strategy: BuildStrategy,
    /// how to get a (k-1)-coloring from a k-coloring
    pub update_strategy: EpocheStrategy,
    /// merge source
    pub source_target: EpocheTarget,
    /// merge destination
    pub destination_target: EpocheTarget,
    /// upper bound estimator
    pub upper_bound: UpperBoundMethod,
    /// zero the edge weights at the beginning of every epoch
    pub reset_weights: bool,
    /// known lower bound of the chromatic number
    pub lower_bound: usize,
    /// iteration limit (0: unbounded)
    pub max_iter: u64,
    /// consecutive zero-delta moves triggering a weight update
    pub max_plateau: u64,
    /// iterations without improving the best solution before giving up the epoch
    pub max_no_improve: u64,
    /// coefficient of the guidance in the total score
    pub lambda: i64,
    /// calibrate lambda on the first weight update of every epoch
    pub dynamic_lambda: bool,
    /// use the moves queues (otherwise scan every move at each iteration)
    pub moves_queue: bool,
    /// maximum number of tied moves returned by a queue head
    pub head_capacity: usize,
    /// enable aspiration moves
    pub aspiration: bool,
    /// forbid a vertex to go back to the color it left until one of its neighbors moves
    pub fast_search: bool,
    /// time limit in seconds (0: unbounded)
    pub timeout: u64,
    /// seed of the random number generator
    pub seed: u64,
    /// bitwise mask of DEBUG_* levels
    pub debug: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_strategy: BuildStrategy::Greedy,
            update_strategy: EpocheStrategy::Merge,
            source_target: EpocheTarget::Minimal,
            destination_target: EpocheTarget::Maximal,
            upper_bound: UpperBoundMethod::Theorem2,
            reset_weights: true,
            lower_bound: 2,
            max_iter: 0,
            max_plateau: 5,
            max_no_improve: 100_000,
            lambda: 10,
            dynamic_lambda: false,
            moves_queue: true,
            head_capacity: 8,
            aspiration: true,
            fast_search: false,
            timeout: 120,
            seed: 0,
            debug: 0,
        }
    }
}

impl Config {
    /// checks that the options can be used together
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_strategy == EpocheStrategy::Scratch
        && self.build_strategy != BuildStrategy::RandomStart {
            return Err(ConfigError::ScratchRequiresRandomStart);
        }
        if self.dynamic_lambda && !self.reset_weights {
            return Err(ConfigError::DynamicLambdaWithKeptWeights);
        }
        if self.moves_queue && self.head_capacity == 0 {
            return Err(ConfigError::ZeroHeadCapacity);
        }
        if self.lambda < 0 {
            return Err(ConfigError::NegativeLambda(self.lambda));
        }
        Ok(())
    }

    /// true iff the debug level is enabled
    pub fn debug_enabled(&self, level:u32) -> bool { self.debug & level != 0 }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_scratch_requires_random_start() {
        let mut config = Config { update_strategy: EpocheStrategy::Scratch, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::ScratchRequiresRandomStart));
        config.build_strategy = BuildStrategy::RandomStart;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_dynamic_lambda_requires_reset() {
        let config = Config { dynamic_lambda: true, reset_weights: false, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::DynamicLambdaWithKeptWeights));
    }

    #[test]
    fn test_other_errors() {
        let config = Config { head_capacity: 0, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroHeadCapacity));
        let config = Config { head_capacity: 0, moves_queue: false, ..Config::default() };
        assert_eq!(config.validate(), Ok(()));
        let config = Config { lambda: -1, ..Config::default() };
        assert_eq!(config.validate(), Err(ConfigError::NegativeLambda(-1)));
    }

    #[test]
    fn test_partial_json() {
        let config:Config = serde_json::from_str(r#"{"lambda": 3, "aspiration": false}"#).unwrap();
        assert_eq!(config.lambda, 3);
        assert!(!config.aspiration);
        assert_eq!(config.max_plateau, 5);
        assert!(!config.fast_search);
        assert!(!config.debug_enabled(DEBUG_MOVES));
        let config:Config = serde_json::from_str(r#"{"fast_search": true}"#).unwrap();
        assert!(config.fast_search);
    }
}
