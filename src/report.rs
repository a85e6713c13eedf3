use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::score::Score;

/** State of a k-coloring search. */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum Resolution {
    /// the current coloring still contains conflicts
    NotFound,
    /// the best coloring has no conflict
    Solved,
    /// the score did not change for some moves: update the weights
    NoImprove,
    /// no acceptable move: update the weights
    LocalMin,
    /// iteration limit (or long stagnation) reached
    MaxIterations,
    /// time limit reached
    Timeout,
}

impl Resolution {
    /// true iff the search for the current k is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Resolution::Solved | Resolution::MaxIterations | Resolution::Timeout)
    }
}


/** Statistics of a search (one epoch, or cumulated over the epochs).
Purely observational: only read back to display them.
*/
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolveReport {
    /// number of colors
    pub k: usize,
    /// starting score
    pub start: Score,
    /// ending score
    pub end: Score,
    /// time spent
    pub elapsed: Duration,
    /// iterations
    pub iters: u64,
    /// weight updates
    pub updates: u64,
    /// improvements of the best solution
    pub improvements: u64,
    /// aspiration moves
    pub aspirations: u64,
    /// local minima
    pub mins: u64,
    /// how the search ended
    pub resolution: Option<Resolution>,
    /// true iff the starting coloring had no conflict
    pub skipped: bool,
}

impl SolveReport {
    /// empty report for k colors
    pub fn new(k:usize) -> Self { Self { k, ..Self::default() } }

    /// adds the counters of an epoch report
    pub fn accumulate(&mut self, epoch:&SolveReport) {
        self.iters += epoch.iters;
        self.updates += epoch.updates;
        self.improvements += epoch.improvements;
        self.aspirations += epoch.aspirations;
        self.mins += epoch.mins;
    }

    /// exports the report as a json value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// logs the report (k, iters, time, improvements, mins, updates, aspirations, start, end)
    pub fn print(&self, title:&str) {
        tracing::info!(
            k = self.k,
            iters = self.iters,
            elapsed_ms = self.elapsed.as_millis() as u64,
            improvements = self.improvements,
            mins = self.mins,
            updates = self.updates,
            aspirations = self.aspirations,
            start_conflicts = self.start.conflicts,
            start_guidance = self.start.guidance,
            start_total = self.start.total,
            end_conflicts = self.end.conflicts,
            end_guidance = self.end.guidance,
            end_total = self.end.total,
            "{}", title
        );
    }
}


/** Termination policy of the search, evaluated at every iteration. */
#[derive(Debug, Clone, Copy)]
pub struct Termination {
    /// iteration limit (0: unbounded)
    pub max_iter: u64,
    /// plateau length triggering a weight update (0: never)
    pub max_plateau: u64,
    /// iterations without improvement before giving up (0: never)
    pub max_no_improve: u64,
    /// time limit (zero: unbounded)
    pub timeout: Duration,
}

impl Termination {
    /// reads the limits of a configuration
    pub fn new(config:&Config) -> Self {
        Self {
            max_iter: config.max_iter,
            max_plateau: config.max_plateau,
            max_no_improve: config.max_no_improve,
            timeout: Duration::from_secs(config.timeout),
        }
    }

    /** returns the resolution forced by the limits, if any.
    - iters: iterations since the solver creation
    - elapsed: time since the solver creation
    - plateau: consecutive moves without score change
    - no_improve: iterations since the last improvement of the best solution
    */
    pub fn evaluate(&self, iters:u64, elapsed:Duration, plateau:u64, no_improve:u64) -> Option<Resolution> {
        if !self.timeout.is_zero() && elapsed > self.timeout {
            Some(Resolution::Timeout)
        } else if self.max_iter > 0 && iters > self.max_iter {
            Some(Resolution::MaxIterations)
        } else if self.max_no_improve > 0 && no_improve >= self.max_no_improve {
            Some(Resolution::MaxIterations)
        } else if self.max_plateau > 0 && plateau >= self.max_plateau {
            Some(Resolution::NoImprove)
        } else {
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn termination() -> Termination {
        Termination { max_iter: 100, max_plateau: 3, max_no_improve: 50, timeout: Duration::from_secs(2) }
    }

    #[test]
    fn test_no_limit_reached() {
        assert_eq!(termination().evaluate(10, Duration::from_millis(10), 2, 49), None);
    }

    #[test]
    fn test_limits() {
        let t = termination();
        assert_eq!(t.evaluate(10, Duration::from_secs(3), 0, 0), Some(Resolution::Timeout));
        assert_eq!(t.evaluate(101, Duration::ZERO, 0, 0), Some(Resolution::MaxIterations));
        assert_eq!(t.evaluate(10, Duration::ZERO, 0, 50), Some(Resolution::MaxIterations));
        assert_eq!(t.evaluate(10, Duration::ZERO, 3, 0), Some(Resolution::NoImprove));
        // timeout first, plateau last
        assert_eq!(t.evaluate(101, Duration::from_secs(3), 3, 50), Some(Resolution::Timeout));
        assert_eq!(t.evaluate(10, Duration::ZERO, 3, 50), Some(Resolution::MaxIterations));
    }

    #[test]
    fn test_unbounded() {
        let t = Termination { max_iter: 0, max_plateau: 0, max_no_improve: 0, timeout: Duration::ZERO };
        assert_eq!(t.evaluate(u64::MAX, Duration::from_secs(1_000_000), u64::MAX, u64::MAX), None);
    }

    #[test]
    fn test_report() {
        let mut total = SolveReport::new(5);
        let epoch = SolveReport { iters: 10, updates: 2, improvements: 3, aspirations: 1, mins: 1, ..SolveReport::new(4) };
        total.accumulate(&epoch);
        total.accumulate(&epoch);
        assert_eq!((total.iters, total.updates, total.improvements, total.aspirations, total.mins), (20, 4, 6, 2, 2));
        let json = epoch.to_json();
        assert_eq!(json["k"], 4);
        assert_eq!(json["iters"], 10);
        assert!(!Resolution::NoImprove.is_terminal());
        assert!(Resolution::Timeout.is_terminal());
    }
}
