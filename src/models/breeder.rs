use crate::models::{Crossover, Individual, Mutagen, Schedule};
use rand::Rng;

/// Produces children from selected parent pairs: crossover with
/// `crossover_rate` (otherwise a clone of the first parent), then mutation.
pub(crate) struct Breeder<'a> {
    crossover: &'a Crossover,
    crossover_rate: f64,
    mutagen: &'a Mutagen,
}

impl<'a> Breeder<'a> {
    pub(crate) fn new(crossover: &'a Crossover, crossover_rate: f64, mutagen: &'a Mutagen) -> Self {
        Self {
            crossover,
            crossover_rate,
            mutagen,
        }
    }

    fn breed_child(
        &self,
        parent1: &Schedule,
        parent2: &Schedule,
        progress: f64,
        rng: &mut impl Rng,
    ) -> Schedule {
        let mut child = if self.crossover_rate > 0.0 && rng.random_bool(self.crossover_rate) {
            self.crossover.apply(rng, parent1, parent2)
        } else {
            parent1.clone()
        };

        self.mutagen.mutate(rng, &mut child, progress);

        child
    }

    pub(crate) fn breed_batch(
        &self,
        parent_pairs: &[(usize, usize)],
        candidates: &[Individual],
        progress: f64,
        rng: &mut impl Rng,
    ) -> Vec<Schedule> {
        parent_pairs
            .iter()
            .map(|&(i, j)| {
                self.breed_child(
                    &candidates[i].schedule,
                    &candidates[j].schedule,
                    progress,
                    rng,
                )
            })
            .collect()
    }
}
