use super::ViolationReport;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How much detail an evaluation should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Penalty totals and fitness only, the report stays empty.
    Totals,
    /// Totals plus every violation description.
    Full,
}

/// Outcome of scoring one schedule. Lower fitness is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub hard_penalty: u64,
    pub soft_penalty: u64,
    /// `hard_penalty * hard_weight + soft_penalty`, where the hard weight exceeds
    /// any soft penalty reachable for the run's parameters.
    pub fitness: f64,
    pub report: ViolationReport,
}

impl Evaluation {
    /// Orders evaluations best first: fewer hard penalty points always wins,
    /// soft penalty only breaks ties.
    pub fn rank(&self, other: &Evaluation) -> Ordering {
        (self.hard_penalty, self.soft_penalty).cmp(&(other.hard_penalty, other.soft_penalty))
    }

    pub fn is_better_than(&self, other: &Evaluation) -> bool {
        self.rank(other) == Ordering::Less
    }
}
