use super::{Detail, Evaluation, Schedule};
use std::sync::atomic::{AtomicBool, Ordering};

/// Objective function scoring a schedule. Lower fitness is better.
///
/// Implementations must be deterministic: the same schedule always yields the
/// same evaluation. An error aborts the run that asked for the evaluation.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, schedule: &Schedule, detail: Detail) -> Result<Evaluation, anyhow::Error>;
}

/// Cooperative cancellation, polled by the engine between generations.
pub trait Terminated: Send + Sync {
    fn is_terminated(&self) -> bool;
}

/// Never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverTerminated;

impl Terminated for NeverTerminated {
    fn is_terminated(&self) -> bool {
        false
    }
}

/// Terminated once the flag is raised.
impl Terminated for AtomicBool {
    fn is_terminated(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}
