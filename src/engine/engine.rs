use super::{EngineConfig, EngineError, EngineState, Outcome, ProgressSink, ProgressSnapshot};
use crate::models::{
    Breeder, ConstraintEvaluator, Detail, Evaluator, Mutagen, MutationRate, Parameters,
    Population, ProbabilityOutOfRangeError, Terminated,
};
use rand::{SeedableRng, rngs::StdRng};
use tracing::instrument;

/// Drives the generation loop of a single run.
///
/// An engine runs at most once: `Created → Running → Completed | Failed`.
/// The loop is synchronous; cancellation is observed between generations only.
pub struct Engine {
    parameters: Parameters,
    config: EngineConfig,
    evaluator: Box<dyn Evaluator>,
    mutagen: Mutagen,
    state: EngineState,
}

impl Engine {
    /// Engine scoring schedules with the [`ConstraintEvaluator`] configured by `config`.
    pub fn new(parameters: Parameters, config: EngineConfig) -> Result<Self, EngineError> {
        let evaluator = ConstraintEvaluator::new(&parameters, config.constraints.clone());
        Self::with_evaluator(parameters, config, Box::new(evaluator))
    }

    pub fn with_evaluator(
        parameters: Parameters,
        config: EngineConfig,
        evaluator: Box<dyn Evaluator>,
    ) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&config.crossover_rate) {
            return Err(ProbabilityOutOfRangeError(config.crossover_rate).into());
        }
        config.crossover.validate()?;

        let mutation_rate = MutationRate::new(parameters.mutation_rate, config.decay.clone())
            .map_err(crate::models::MutagenError::from)?;
        let mutagen = Mutagen::new(mutation_rate, config.repair_rate)?;

        Ok(Self {
            parameters,
            config,
            evaluator,
            mutagen,
            state: EngineState::Created,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Runs the generation loop to completion, publishing a snapshot for the
    /// initial population and after every generation.
    #[instrument(level = "info", skip_all, fields(population_size = self.parameters.population_size, generations = self.parameters.generations, staff_count = self.parameters.staff_count, day_count = self.parameters.day_count))]
    pub fn run(
        &mut self,
        sink: &mut dyn ProgressSink,
        terminated: &dyn Terminated,
    ) -> Result<Outcome, EngineError> {
        if self.state != EngineState::Created {
            return Err(EngineError::InvalidState(self.state));
        }
        self.state = EngineState::Running;

        let result = self.evolve(sink, terminated);

        match &result {
            Ok(outcome) => {
                self.state = EngineState::Completed;
                tracing::info!(
                    message = "Run completed",
                    generations_run = outcome.generations_run,
                    hard_penalty = outcome.best.evaluation.hard_penalty,
                    soft_penalty = outcome.best.evaluation.soft_penalty,
                    classification = ?outcome.classification,
                );
            }
            Err(err) => {
                self.state = EngineState::Failed;
                tracing::warn!(message = "Run failed", err = %err);
            }
        }

        result
    }

    fn evolve(
        &self,
        sink: &mut dyn ProgressSink,
        terminated: &dyn Terminated,
    ) -> Result<Outcome, EngineError> {
        let mut rng = match self.parameters.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        if terminated.is_terminated() {
            return Err(EngineError::Cancelled);
        }

        let evaluator = self.evaluator.as_ref();
        let breeder = Breeder::new(
            &self.config.crossover,
            self.config.crossover_rate,
            &self.mutagen,
        );
        let goal = &self.config.goal;
        let total = self.parameters.generations;

        let mut population = Population::initialize(&self.parameters, evaluator, &mut rng)?;
        let mut evolution = Vec::with_capacity(total + 1);
        evolution.push(population.best().evaluation.fitness);
        sink.publish(ProgressSnapshot::of(0, total, population.best()));

        while population.generation() < total {
            let best = &population.best().evaluation;
            if goal.is_reached(best.hard_penalty, best.soft_penalty) {
                tracing::info!(
                    message = "Quality goal reached, stopping early",
                    generation = population.generation()
                );
                break;
            }

            if terminated.is_terminated() {
                return Err(EngineError::Cancelled);
            }

            let progress = population.generation() as f64 / total as f64;
            population = population.next_generation(
                &self.config.selector,
                &breeder,
                self.config.elitism,
                evaluator,
                progress,
                &mut rng,
            )?;

            let best = population.best();
            evolution.push(best.evaluation.fitness);
            sink.publish(ProgressSnapshot::of(population.generation(), total, best));

            tracing::debug!(
                message = "Generation bred",
                generation = population.generation(),
                best_fitness = best.evaluation.fitness,
                hard_penalty = best.evaluation.hard_penalty,
                soft_penalty = best.evaluation.soft_penalty,
            );
        }

        let mut best = population.best().clone();
        best.evaluation = evaluator.evaluate(&best.schedule, Detail::Full)?;
        let classification =
            goal.classify(best.evaluation.hard_penalty, best.evaluation.soft_penalty);

        Ok(Outcome {
            best,
            classification,
            evolution,
            generations_run: population.generation(),
            total_generations: total,
            specialists: self.config.constraints.specialists(&self.parameters),
        })
    }
}
