use crate::engine::EngineError;
use crate::models::ValidationError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("EngineError: {0}")]
    Engine(#[from] EngineError),
    #[error("SessionNotFound: {0}")]
    SessionNotFound(Uuid),
    #[error("NotReady: {0}")]
    NotReady(Uuid),
    #[error("EngineFailure: {0}")]
    EngineFailure(String),
}
