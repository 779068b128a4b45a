use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Quality class of a scored schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// No hard penalty and a soft penalty at or below the goal's limit.
    Optimal,
    /// No hard penalty, soft penalty above the limit.
    Acceptable,
    /// Hard violations remain.
    Invalid,
}

impl Classification {
    pub fn is_optimal(self) -> bool {
        self == Classification::Optimal
    }

    /// Optimal schedules are acceptable too.
    pub fn is_acceptable(self) -> bool {
        self != Classification::Invalid
    }
}

/// Classifies schedules from their penalty totals and decides whether a run may stop early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGoal {
    /// Largest soft penalty an optimal schedule may carry.
    pub optimal_soft_limit: u64,
    /// Stop the generation loop as soon as the best schedule is optimal.
    pub stop_when_optimal: bool,
}

impl Default for QualityGoal {
    fn default() -> Self {
        Self {
            optimal_soft_limit: 19,
            stop_when_optimal: false,
        }
    }
}

impl QualityGoal {
    #[instrument(level = "debug", skip(self), fields(hard_penalty = hard_penalty, soft_penalty = soft_penalty))]
    pub fn classify(&self, hard_penalty: u64, soft_penalty: u64) -> Classification {
        if hard_penalty > 0 {
            Classification::Invalid
        } else if soft_penalty <= self.optimal_soft_limit {
            Classification::Optimal
        } else {
            Classification::Acceptable
        }
    }

    /// Whether the generation loop may terminate before the generation budget is spent.
    pub(crate) fn is_reached(&self, hard_penalty: u64, soft_penalty: u64) -> bool {
        self.stop_when_optimal && self.classify(hard_penalty, soft_penalty).is_optimal()
    }
}
