use crate::models::{
    Breeder, Detail, Evaluator, Individual, Parameters, Schedule, SelectionError, Selector,
};
use rand::Rng;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] anyhow::Error),
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),
    #[error("Population size must be at least 1")]
    Empty,
}

/// One generation of scored schedules. The size stays fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct Population {
    generation: usize,
    individuals: Vec<Individual>,
}

fn score(
    schedules: Vec<Schedule>,
    evaluator: &dyn Evaluator,
) -> Result<Vec<Individual>, PopulationError> {
    schedules
        .into_iter()
        .map(|schedule| -> Result<Individual, PopulationError> {
            let evaluation = evaluator.evaluate(&schedule, Detail::Totals)?;
            Ok(Individual::new(schedule, evaluation))
        })
        .collect()
}

impl Population {
    /// Generation 0: `population_size` random schedules, all scored.
    #[instrument(level = "debug", skip_all, fields(population_size = parameters.population_size, staff_count = parameters.staff_count, day_count = parameters.day_count))]
    pub fn initialize(
        parameters: &Parameters,
        evaluator: &dyn Evaluator,
        rng: &mut impl Rng,
    ) -> Result<Self, PopulationError> {
        if parameters.population_size == 0 {
            return Err(PopulationError::Empty);
        }

        let schedules = (0..parameters.population_size)
            .map(|_| Schedule::random(parameters.staff_count, parameters.day_count, rng))
            .collect();

        Ok(Self {
            generation: 0,
            individuals: score(schedules, evaluator)?,
        })
    }

    /// Builds the next generation: the `elitism` best individuals carried over
    /// unmodified, the remaining slots filled with scored children of selected
    /// parents.
    #[instrument(level = "debug", skip(self, selector, breeder, evaluator, rng), fields(generation = self.generation))]
    pub(crate) fn next_generation(
        &self,
        selector: &Selector,
        breeder: &Breeder<'_>,
        elitism: usize,
        evaluator: &dyn Evaluator,
        progress: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, PopulationError> {
        let size = self.individuals.len();
        let elite_count = elitism.clamp(1, size);

        let mut ranked: Vec<usize> = (0..size).collect();
        // Stable sort keeps earlier individuals first among equals
        ranked.sort_by(|&a, &b| {
            self.individuals[a]
                .evaluation
                .rank(&self.individuals[b].evaluation)
        });

        let mut individuals: Vec<Individual> = ranked[..elite_count]
            .iter()
            .map(|&index| self.individuals[index].clone())
            .collect();

        let parent_pairs = selector.select_pairs(size - elite_count, &self.individuals, rng)?;
        let children = breeder.breed_batch(&parent_pairs, &self.individuals, progress, rng);
        individuals.extend(score(children, evaluator)?);

        Ok(Self {
            generation: self.generation + 1,
            individuals,
        })
    }

    /// Best individual: fewest hard penalty points, then fewest soft. The first wins ties.
    pub fn best(&self) -> &Individual {
        // The constructors guarantee at least one individual
        let mut best = &self.individuals[0];
        for individual in &self.individuals[1..] {
            if individual.evaluation.is_better_than(&best.evaluation) {
                best = individual;
            }
        }
        best
    }

    /// 0 for the initial population.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }
}
