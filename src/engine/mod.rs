mod engine;
mod errors;
mod models;

pub use engine::Engine;
pub use errors::EngineError;
pub use models::{
    BestScore, EngineConfig, EngineState, NullSink, Outcome, ProgressSink, ProgressSnapshot,
};
