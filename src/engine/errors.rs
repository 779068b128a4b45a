use super::EngineState;
use crate::models::{MutagenError, PopulationError, ProbabilityOutOfRangeError};

/// Errors that end a run or prevent it from starting.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("PopulationError: {0}")]
    Population(#[from] PopulationError),
    #[error("EvaluationError: {0}")]
    Evaluation(#[from] anyhow::Error),
    #[error("MutagenError: {0}")]
    Mutagen(#[from] MutagenError),
    #[error("CrossoverRateError: {0}")]
    CrossoverRate(#[from] ProbabilityOutOfRangeError),
    #[error("cancelled")]
    Cancelled,
    #[error("InvalidState: engine is {0:?}")]
    InvalidState(EngineState),
}
