use crate::models::{Evaluation, Schedule};

/// A schedule together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub schedule: Schedule,
    pub evaluation: Evaluation,
}

impl Individual {
    pub fn new(schedule: Schedule, evaluation: Evaluation) -> Self {
        Self {
            schedule,
            evaluation,
        }
    }
}
