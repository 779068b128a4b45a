use crate::models::{
    Classification, ConstraintConfig, Crossover, Decay, Individual, QualityGoal, Selector,
};
use serde::{Deserialize, Serialize};

/// Lifecycle of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Created,
    Running,
    Completed,
    Failed,
}

/// Operator and rule settings shared by every run of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub constraints: ConstraintConfig,
    pub selector: Selector,
    pub crossover: Crossover,
    /// Probability that a parent pair is recombined rather than cloned.
    pub crossover_rate: f64,
    /// Number of best individuals carried over unchanged. At least 1 is always kept.
    pub elitism: usize,
    /// Probability that a child gets its Night to Morning transitions repaired.
    pub repair_rate: f64,
    /// Decay of the requested mutation rate over the run. Constant unless opted in.
    pub decay: Decay,
    pub goal: QualityGoal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            constraints: ConstraintConfig::default(),
            selector: Selector::default(),
            crossover: Crossover::default(),
            crossover_rate: 0.8,
            elitism: 1,
            repair_rate: 0.05,
            decay: Decay::Constant,
            goal: QualityGoal::default(),
        }
    }
}

/// Scores of the best schedule found so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestScore {
    pub fitness: f64,
    pub hard_penalty: u64,
    pub soft_penalty: u64,
}

/// Best-so-far state after a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// 0 before the first generation is bred.
    pub generation: usize,
    pub total_generations: usize,
    /// `None` until the initial population has been scored.
    pub best: Option<BestScore>,
}

impl ProgressSnapshot {
    pub fn initial(total_generations: usize) -> Self {
        Self {
            generation: 0,
            total_generations,
            best: None,
        }
    }

    pub(crate) fn of(generation: usize, total_generations: usize, best: &Individual) -> Self {
        Self {
            generation,
            total_generations,
            best: Some(BestScore {
                fitness: best.evaluation.fitness,
                hard_penalty: best.evaluation.hard_penalty,
                soft_penalty: best.evaluation.soft_penalty,
            }),
        }
    }

    /// `generation / total_generations` as a percentage, 0 when there is nothing to run.
    pub fn percentage(&self) -> f64 {
        if self.total_generations == 0 {
            return 0.0;
        }
        self.generation as f64 / self.total_generations as f64 * 100.0
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Best schedule, scored with the full violation report.
    pub best: Individual,
    pub classification: Classification,
    /// Best fitness of every generation, index 0 is the initial population.
    pub evolution: Vec<f64>,
    /// Generations actually bred; below the requested count after an early stop.
    pub generations_run: usize,
    pub total_generations: usize,
    /// Effective specialists, 0-based and ascending.
    pub specialists: Vec<usize>,
}

/// Receives one snapshot per generation.
pub trait ProgressSink: Send {
    fn publish(&mut self, snapshot: ProgressSnapshot);
}

/// Discards snapshots.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn publish(&mut self, _: ProgressSnapshot) {}
}

impl ProgressSink for Vec<ProgressSnapshot> {
    fn publish(&mut self, snapshot: ProgressSnapshot) {
        self.push(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_computes_the_percentage_from_generations() {
        let snapshot = ProgressSnapshot {
            generation: 25,
            ..ProgressSnapshot::initial(200)
        };
        assert_eq!(snapshot.percentage(), 12.5);
        assert_eq!(ProgressSnapshot::initial(0).percentage(), 0.0);
    }
}
