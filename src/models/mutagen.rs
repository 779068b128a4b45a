use crate::models::{ProbabilityOutOfRangeError, Schedule, Shift};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Shifts that may replace a Morning which directly follows a Night.
const AFTER_NIGHT: [Shift; 3] = [Shift::Rest, Shift::Afternoon, Shift::Night];

fn decay_linear(value: f64, progress: f64, multiplier: f64) -> f64 {
    value * (1.0 - progress * multiplier).max(0.0)
}

fn decay_exponential(value: f64, progress: f64, multiplier: f64, exponent: i32) -> f64 {
    value * (1.0 - progress * multiplier).max(0.0).powi(exponent)
}

// ============================================================
// Decay
// ============================================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Decay {
    #[default]
    Constant,
    Linear { multiplier: f64 },
    Exponential { multiplier: f64, exponent: i32 },
}

impl Decay {
    fn apply(&self, value: f64, progress: f64) -> f64 {
        match self {
            Decay::Constant => value,
            Decay::Linear { multiplier } => decay_linear(value, progress, *multiplier),
            Decay::Exponential {
                multiplier,
                exponent,
            } => decay_exponential(value, progress, *multiplier, *exponent),
        }
    }
}

// ============================================================
// MutationRate
// ============================================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRate {
    value: f64,
    decay: Decay,
}

#[derive(Debug, thiserror::Error)]
#[error("mutation_rate must be between 0.0 and 1.0, got: {0}")]
pub struct MutationRateOutOfRange(f64);

impl MutationRate {
    pub fn new(value: f64, decay: Decay) -> Result<Self, MutationRateOutOfRange> {
        let value = Self::validate(value)?;

        Ok(Self { value, decay })
    }

    pub fn constant(value: f64) -> Result<Self, MutationRateOutOfRange> {
        Self::new(value, Decay::Constant)
    }

    fn validate(value: f64) -> Result<f64, MutationRateOutOfRange> {
        if !(0.0..=1.0).contains(&value) {
            return Err(MutationRateOutOfRange(value));
        }

        Ok(value)
    }

    /// Effective per-cell rate at `progress` (0.0 at the first generation, 1.0 at the last).
    pub(crate) fn get(&self, progress: f64) -> f64 {
        self.decay.apply(self.value, progress).clamp(0.0, 1.0)
    }
}

// ============================================================
// Mutagen
// ============================================================

/// Perturbs freshly bred schedules.
///
/// Every cell is replaced, with the mutation rate, by a uniformly chosen
/// *different* shift. A child may then be repaired with `repair_rate`: every
/// Morning that directly follows a Night in the same row is rewritten to a
/// random non-Morning shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutagen {
    mutation_rate: MutationRate,
    repair_rate: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum MutagenError {
    #[error("Mutation rate error: {0}")]
    MutationRate(#[from] MutationRateOutOfRange),
    #[error("Repair rate error: {0}")]
    RepairRate(#[from] ProbabilityOutOfRangeError),
}

impl Mutagen {
    pub fn new(mutation_rate: MutationRate, repair_rate: f64) -> Result<Self, MutagenError> {
        if !(0.0..=1.0).contains(&repair_rate) {
            return Err(ProbabilityOutOfRangeError(repair_rate).into());
        }

        Ok(Self {
            mutation_rate,
            repair_rate,
        })
    }

    pub fn constant(mutation_rate: f64, repair_rate: f64) -> Result<Self, MutagenError> {
        Self::new(MutationRate::constant(mutation_rate)?, repair_rate)
    }

    #[instrument(level = "debug", skip(self, rng, schedule), fields(progress = progress))]
    pub(crate) fn mutate<R: Rng>(&self, rng: &mut R, schedule: &mut Schedule, progress: f64) {
        let mutation_rate = self.mutation_rate.get(progress);

        if mutation_rate > 0.0 {
            for cell in schedule.cells_mut() {
                if rng.random_bool(mutation_rate) {
                    *cell = cell.random_other(rng);
                }
            }
        }

        if self.repair_rate > 0.0 && rng.random_bool(self.repair_rate) {
            repair_night_morning(rng, schedule);
        }
    }
}

/// Rewrites every Morning that follows a Night on the previous day.
fn repair_night_morning<R: Rng>(rng: &mut R, schedule: &mut Schedule) {
    for staff in 0..schedule.staff_count() {
        let row = schedule.row_mut(staff);
        for day in 1..row.len() {
            if row[day - 1] == Shift::Night && row[day] == Shift::Morning {
                // AFTER_NIGHT is a non-empty constant
                row[day] = *AFTER_NIGHT.choose(rng).unwrap_or(&Shift::Rest);
            }
        }
    }
}
