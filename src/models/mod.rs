mod breeder;
mod constraints;
mod crossover;
mod evaluator;
mod fitness;
mod goal;
mod individual;
mod mutagen;
mod parameters;
mod population;
mod schedule;
mod selector;
mod shift;
mod violations;

pub use constraints::{ConstraintConfig, ConstraintEvaluator, PenaltyWeights};
pub use crossover::{Crossover, ProbabilityOutOfRangeError};
pub use evaluator::{Evaluator, NeverTerminated, Terminated};
pub use fitness::{Detail, Evaluation};
pub use goal::{Classification, QualityGoal};
pub use individual::Individual;
pub use mutagen::{Decay, Mutagen, MutagenError, MutationRate, MutationRateOutOfRange};
pub use parameters::{
    Numeric, ParameterDocument, Parameters, Preference, PreferenceDocument, ValidationError,
    ValidationLimits,
};
pub use population::{Population, PopulationError};
pub use schedule::{RaggedRowsError, Schedule};
pub use selector::{SelectionError, Selector};
pub use shift::{SHIFT_CONTRACT_VERSION, Shift};
pub use violations::{Severity, ViolationKind, ViolationReport};

pub(crate) use breeder::Breeder;
