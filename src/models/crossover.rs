use crate::models::{Schedule, Shift};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Performs uniform crossover by taking each cell from `lhs` with the given probability.
#[instrument(level = "debug", skip(rng, lhs, rhs), fields(staff = lhs.staff_count(), days = lhs.day_count(), probability = probability))]
fn crossover_uniform<R: Rng>(
    rng: &mut R,
    lhs: &Schedule,
    rhs: &Schedule,
    probability: f64,
) -> Schedule {
    let cells: Vec<Shift> = lhs
        .rows()
        .zip(rhs.rows())
        .flat_map(|(lhs_row, rhs_row)| lhs_row.iter().zip(rhs_row.iter()))
        .map(|(&lhs, &rhs)| if rng.random_bool(probability) { lhs } else { rhs })
        .collect();

    Schedule::from_cells(lhs.staff_count(), lhs.day_count(), cells)
}

/// Splices one staff row: days `[0, cut)` from `lhs`, days `[cut, len)` from `rhs`.
fn splice_row(child: &mut [Shift], lhs: &[Shift], rhs: &[Shift], cut: usize) {
    child[..cut].copy_from_slice(&lhs[..cut]);
    child[cut..].copy_from_slice(&rhs[cut..]);
}

/// Performs single-point crossover independently on every staff row.
#[instrument(level = "debug", skip(rng, lhs, rhs), fields(staff = lhs.staff_count(), days = lhs.day_count()))]
fn crossover_row_single_point<R: Rng>(rng: &mut R, lhs: &Schedule, rhs: &Schedule) -> Schedule {
    let days = lhs.day_count();
    let mut child = lhs.clone();

    for staff in 0..lhs.staff_count() {
        let cut = rng.random_range(0..=days);
        splice_row(child.row_mut(staff), lhs.row(staff), rhs.row(staff), cut);
    }

    child
}

/// Crossover strategy for combining two parent schedules into a child.
///
/// # Strategies
///
/// ## Row-wise single point
/// For each staff member independently a cut day is drawn uniformly from
/// `0..=days`. The child's row takes the days before the cut from the first parent
/// and the rest from the second. Runs of consecutive days stay intact, which
/// matters for the rules that look at neighbouring days (night followed by
/// morning, consecutive working days).
///
/// ## Uniform
/// Each cell is independently taken from the first parent with `probability`,
/// otherwise from the second. Mixes more aggressively but breaks day runs.
///
/// Both strategies return a copy of the parents when the parents are identical.
///
/// # Examples
///
/// ```rust
/// use roster_ga::models::Crossover;
///
/// let row_wise = Crossover::row_single_point();
/// let uniform = Crossover::uniform(0.5)?;
/// assert!(Crossover::uniform(1.5).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Crossover {
    /// Each cell comes from the first parent with this probability.
    Uniform { probability: f64 },
    /// Single cut point per staff row.
    #[default]
    RowSinglePoint,
}

/// Error returned when a probability lies outside [0.0, 1.0].
#[derive(Debug, thiserror::Error)]
#[error("probability must be between 0.0 and 1.0, got {0}")]
pub struct ProbabilityOutOfRangeError(pub(crate) f64);

impl Crossover {
    /// Creates a uniform crossover strategy with specified selection probability.
    pub fn uniform(probability: f64) -> Result<Self, ProbabilityOutOfRangeError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ProbabilityOutOfRangeError(probability));
        }

        Ok(Self::Uniform { probability })
    }

    /// Checks the probability of a strategy built without [`Crossover::uniform`].
    pub fn validate(&self) -> Result<(), ProbabilityOutOfRangeError> {
        match self {
            Self::Uniform { probability } if !(0.0..=1.0).contains(probability) => {
                Err(ProbabilityOutOfRangeError(*probability))
            }
            _ => Ok(()),
        }
    }

    /// Creates the row-wise single-point crossover strategy.
    pub fn row_single_point() -> Self {
        Self::RowSinglePoint
    }

    /// Applies the crossover to two parents of the same shape, producing a new schedule.
    #[instrument(level = "debug", skip(self, rng, lhs, rhs), fields(crossover_type = ?self))]
    pub(crate) fn apply<R: Rng>(&self, rng: &mut R, lhs: &Schedule, rhs: &Schedule) -> Schedule {
        debug_assert!(lhs.has_shape(rhs.staff_count(), rhs.day_count()));

        match self {
            Self::Uniform { probability } => crossover_uniform(rng, lhs, rhs, *probability),
            Self::RowSinglePoint => crossover_row_single_point(rng, lhs, rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn uniform_schedule(staff: usize, days: usize, shift: Shift) -> Schedule {
        Schedule::filled(staff, days, shift)
    }

    #[test]
    fn it_splices_a_row_at_the_cut() {
        let lhs = [Shift::Morning; 5];
        let rhs = [Shift::Night; 5];
        let mut child = [Shift::Rest; 5];

        splice_row(&mut child, &lhs, &rhs, 2);
        assert_eq!(
            child,
            [
                Shift::Morning,
                Shift::Morning,
                Shift::Night,
                Shift::Night,
                Shift::Night
            ]
        );

        splice_row(&mut child, &lhs, &rhs, 0);
        assert_eq!(child, rhs);

        splice_row(&mut child, &lhs, &rhs, 5);
        assert_eq!(child, lhs);
    }

    #[test]
    fn it_keeps_a_single_transition_per_row() {
        let mut rng = StdRng::seed_from_u64(42);
        let lhs = uniform_schedule(6, 10, Shift::Morning);
        let rhs = uniform_schedule(6, 10, Shift::Night);

        let child = Crossover::RowSinglePoint.apply(&mut rng, &lhs, &rhs);

        for row in child.rows() {
            // A prefix of Morning followed by a suffix of Night
            let cut = row.iter().take_while(|&&s| s == Shift::Morning).count();
            assert!(row[cut..].iter().all(|&s| s == Shift::Night));
        }
    }

    #[test]
    fn it_returns_identical_content_for_identical_parents() {
        let mut rng = StdRng::seed_from_u64(3);
        let parent = Schedule::random(5, 14, &mut rng);

        for crossover in [Crossover::RowSinglePoint, Crossover::Uniform { probability: 0.5 }] {
            for _ in 0..20 {
                let child = crossover.apply(&mut rng, &parent, &parent.clone());
                assert_eq!(child, parent);
            }
        }
    }

    #[test]
    fn it_takes_every_cell_from_one_of_the_parents() {
        let mut rng = StdRng::seed_from_u64(11);
        let lhs = Schedule::random(4, 9, &mut rng);
        let rhs = Schedule::random(4, 9, &mut rng);

        let child = Crossover::Uniform { probability: 0.5 }.apply(&mut rng, &lhs, &rhs);

        assert!(child.has_shape(4, 9));
        for staff in 0..4 {
            for day in 0..9 {
                let shift = child.get(staff, day);
                assert!(shift == lhs.get(staff, day) || shift == rhs.get(staff, day));
            }
        }
    }

    #[test]
    fn it_handles_uniform_crossover_extreme_probabilities() {
        let mut rng = StdRng::seed_from_u64(42);
        let lhs = uniform_schedule(2, 3, Shift::Afternoon);
        let rhs = uniform_schedule(2, 3, Shift::Rest);

        assert_eq!(Crossover::Uniform { probability: 0.0 }.apply(&mut rng, &lhs, &rhs), rhs);
        assert_eq!(Crossover::Uniform { probability: 1.0 }.apply(&mut rng, &lhs, &rhs), lhs);
    }

    #[test]
    fn it_handles_single_day_horizons() {
        let mut rng = StdRng::seed_from_u64(1);
        let lhs = uniform_schedule(3, 1, Shift::Morning);
        let rhs = uniform_schedule(3, 1, Shift::Night);

        let child = Crossover::RowSinglePoint.apply(&mut rng, &lhs, &rhs);
        assert!(child.has_shape(3, 1));
    }

    #[test]
    fn it_validates_uniform_crossover_probability() {
        assert!(Crossover::uniform(-0.1).is_err());
        assert!(Crossover::uniform(1.5).is_err());
        assert!(Crossover::uniform(0.5).is_ok());
    }
}
