//! Parent selection.
//!
//! Two methods are available:
//!
//! - **Tournament** (default, size 3): each parent is the best of `size`
//!   individuals drawn uniformly with replacement. Pressure grows with `size`.
//! - **Roulette**: each parent is drawn with probability proportional to
//!   `max_fitness - fitness`, so lower fitness weighs more. When every
//!   individual has the same fitness the draw is uniform.
//!
//! ```rust
//! use roster_ga::models::Selector;
//!
//! let tournament = Selector::tournament(3).unwrap();
//! let roulette = Selector::roulette();
//! assert_ne!(tournament, roulette);
//! ```

use crate::models::Individual;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Performs a single roulette wheel spin to select a candidate index.
fn spin_roulette(
    weights: &[f64],
    total_weight: f64,
    rng: &mut impl rand::Rng,
) -> Result<usize, SelectionError> {
    let spin = rng.random_range(0.0..total_weight);
    let mut cumulative = 0.0;

    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative > spin {
            return Ok(index);
        }
    }

    // Unreachable while total_weight is the sum of weights
    Err(SelectionError::RouletteSelectionFailed)
}


/// Index of the best of `tournament_size` uniformly drawn individuals.
fn run_tournament(
    tournament_size: usize,
    candidates: &[Individual],
    rng: &mut impl rand::Rng,
) -> usize {
    let mut winner = rng.random_range(0..candidates.len());
    for _ in 1..tournament_size {
        let challenger = rng.random_range(0..candidates.len());
        if candidates[challenger]
            .evaluation
            .is_better_than(&candidates[winner].evaluation)
        {
            winner = challenger;
        }
    }
    winner
}

#[instrument(level = "trace", skip(candidates, rng), fields(num_pairs = num_pairs, tournament_size = tournament_size, num_candidates = candidates.len()))]
fn tournament_selection(
    num_pairs: usize,
    tournament_size: usize,
    candidates: &[Individual],
    rng: &mut impl rand::Rng,
) -> Vec<(usize, usize)> {
    (0..num_pairs)
        .map(|_| {
            let parent1 = run_tournament(tournament_size, candidates, rng);
            let parent2 = run_tournament(tournament_size, candidates, rng);
            (parent1, parent2)
        })
        .collect()
}

#[instrument(level = "trace", skip(candidates, rng), fields(num_pairs = num_pairs, num_candidates = candidates.len()))]
fn roulette_selection(
    num_pairs: usize,
    candidates: &[Individual],
    rng: &mut impl rand::Rng,
) -> Result<Vec<(usize, usize)>, SelectionError> {
    let max_fitness = candidates
        .iter()
        .map(|individual| individual.evaluation.fitness)
        .fold(f64::MIN, f64::max);

    // Invert: lower fitness = higher weight
    let weights: Vec<f64> = candidates
        .iter()
        .map(|individual| max_fitness - individual.evaluation.fitness)
        .collect();
    let total_weight: f64 = weights.iter().sum();

    if total_weight <= 0.0 {
        return Ok((0..num_pairs)
            .map(|_| {
                (
                    rng.random_range(0..candidates.len()),
                    rng.random_range(0..candidates.len()),
                )
            })
            .collect());
    }

    let mut parent_pairs = Vec::with_capacity(num_pairs);
    for _ in 0..num_pairs {
        let parent1 = spin_roulette(&weights, total_weight, rng)?;
        let parent2 = spin_roulette(&weights, total_weight, rng)?;
        parent_pairs.push((parent1, parent2));
    }

    Ok(parent_pairs)
}

/// Parent selection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// Best of `size` uniformly drawn individuals, with replacement.
    Tournament { size: usize },
    /// Fitness-proportionate draw on inverted fitness.
    Roulette,
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Tournament { size: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("No valid parents available for selection")]
    NoValidParents,
    #[error("Tournament size must be at least 1")]
    InvalidTournamentSize,
    #[error("Internal error: roulette wheel failed to select candidate")]
    RouletteSelectionFailed,
}

impl Selector {
    /// Tournament selection. Sizes above the population size behave like the
    /// population size since draws are made with replacement.
    pub fn tournament(size: usize) -> Result<Self, SelectionError> {
        if size == 0 {
            return Err(SelectionError::InvalidTournamentSize);
        }
        Ok(Selector::Tournament { size })
    }

    pub fn roulette() -> Self {
        Selector::Roulette
    }

    /// Draws `num_pairs` parent index pairs from `candidates`.
    #[instrument(level = "debug", skip(self, candidates, rng), fields(selector = ?self, num_pairs = num_pairs))]
    pub(crate) fn select_pairs(
        &self,
        num_pairs: usize,
        candidates: &[Individual],
        rng: &mut impl rand::Rng,
    ) -> Result<Vec<(usize, usize)>, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::NoValidParents);
        }

        match self {
            Selector::Tournament { size } => Ok(tournament_selection(
                num_pairs,
                (*size).clamp(1, candidates.len()),
                candidates,
                rng,
            )),
            Selector::Roulette => roulette_selection(num_pairs, candidates, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Evaluation, Schedule, Shift, ViolationReport};
    use rand::{SeedableRng, rngs::StdRng};

    fn individual(hard_penalty: u64, soft_penalty: u64) -> Individual {
        Individual {
            schedule: Schedule::filled(1, 1, Shift::Rest),
            evaluation: Evaluation {
                hard_penalty,
                soft_penalty,
                fitness: (hard_penalty * 100 + soft_penalty) as f64,
                report: ViolationReport::default(),
            },
        }
    }

    #[test]
    fn it_rejects_an_empty_tournament() {
        assert_eq!(
            Selector::tournament(0),
            Err(SelectionError::InvalidTournamentSize)
        );
        assert_eq!(Selector::default(), Selector::tournament(3).unwrap());
    }

    #[test]
    fn it_fails_on_an_empty_population() {
        let mut rng = StdRng::seed_from_u64(1);
        for selector in [Selector::default(), Selector::roulette()] {
            assert_eq!(
                selector.select_pairs(2, &[], &mut rng),
                Err(SelectionError::NoValidParents)
            );
        }
    }

    #[test]
    fn it_returns_the_requested_number_of_pairs_within_bounds() {
        let candidates: Vec<Individual> = (0..5).map(|i| individual(i, 0)).collect();
        let mut rng = StdRng::seed_from_u64(2);

        for selector in [Selector::default(), Selector::roulette()] {
            let pairs = selector.select_pairs(7, &candidates, &mut rng).unwrap();
            assert_eq!(pairs.len(), 7);
            assert!(pairs.iter().all(|&(a, b)| a < 5 && b < 5));
        }
    }

    #[test]
    fn it_handles_tournaments_larger_than_the_population() {
        let candidates = vec![individual(3, 0), individual(1, 0)];
        let mut rng = StdRng::seed_from_u64(4);

        let pairs = Selector::tournament(10)
            .unwrap()
            .select_pairs(50, &candidates, &mut rng)
            .unwrap();

        assert_eq!(pairs.len(), 50);
    }

    #[test]
    fn it_favours_better_individuals_in_tournaments() {
        let candidates: Vec<Individual> = (0..10).map(|i| individual(i, 0)).collect();
        let mut rng = StdRng::seed_from_u64(9);

        let pairs = Selector::tournament(3)
            .unwrap()
            .select_pairs(500, &candidates, &mut rng)
            .unwrap();

        let best_half = pairs
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .filter(|&index| index < 5)
            .count();
        // Uniform draws would give about 500
        assert!(best_half > 700);
    }

    #[test]
    fn it_falls_back_to_uniform_roulette_when_all_fitness_is_equal() {
        let candidates: Vec<Individual> = (0..4).map(|_| individual(2, 2)).collect();
        let mut rng = StdRng::seed_from_u64(11);

        let pairs = Selector::roulette()
            .select_pairs(400, &candidates, &mut rng)
            .unwrap();

        let mut counts = [0; 4];
        for (a, b) in pairs {
            counts[a] += 1;
            counts[b] += 1;
        }
        assert!(counts.iter().all(|&count| count > 120));
    }

    #[test]
    fn it_never_picks_the_worst_individual_by_roulette() {
        let candidates = vec![individual(0, 5), individual(1, 0), individual(0, 0)];
        let mut rng = StdRng::seed_from_u64(13);

        let pairs = Selector::roulette()
            .select_pairs(200, &candidates, &mut rng)
            .unwrap();

        assert!(pairs.iter().all(|&(a, b)| a != 1 && b != 1));
    }
}
